//! Fixed contract with the radiocloud web UI: URLs and element selectors.

use rcloud_common::protocol::Selector;
use std::borrow::Cow;

pub const DEFAULT_LOGIN_URL: &str = "https://www.phonostar.de/radio/radioaufnehmen/radiocloud/login";
pub const DEFAULT_RECORDINGS_URL: &str =
    "https://www.phonostar.de/radio/radioaufnehmen/radiocloud/aufnahmen";

const fn css(value: &'static str) -> Selector {
    Selector::Css(Cow::Borrowed(value))
}

const fn xpath(value: &'static str) -> Selector {
    Selector::XPath(Cow::Borrowed(value))
}

// Login page
pub const LOGIN_USER_FIELD: Selector = css("#user_email");
pub const LOGIN_PASSWORD_FIELD: Selector = css("#user_password");
pub const DASHBOARD_MARKER: Selector = css(".dashboard");

// Consent overlay (rendered inside an iframe)
pub const CONSENT_FRAME: Selector = xpath("//iframe[contains(@id,'sp_message')]");
pub const CONSENT_BUTTON: Selector = css("button");

// Recordings listing
pub const RECORDINGS_CONTAINER: Selector =
    xpath("//div[contains(concat(' ', @class, ' '), ' radiocloud-recordings ')]");
pub const RECORDING_ITEM: Selector = css("li");
pub const NESTED_LIST: Selector = css("ul, ol");

// Standard layout
pub const ITEM_TITLE: Selector = css(".li-heading-main");
pub const ITEM_DATE: Selector = css(".description");
pub const ITEM_DURATION: Selector = css(".recording-duration-display");
pub const ITEM_ACTIONS: Selector = css(".recording-actions");
pub const LINK: Selector = css("a");
pub const DELETE_BUTTON: Selector = css("form [name='button']");

// Compact layout
pub const COMPACT_MARKER: Selector = css(".li-compact");
pub const COMPACT_LABEL: Selector = css(".li-compact > .li-label");
pub const COMPACT_SLOT_COUNT: usize = 4;
pub const COMPACT_TITLE_SLOT: usize = 0;
pub const COMPACT_DATE_SLOT: usize = 1;
pub const COMPACT_ACTIONS_SLOT: usize = 3;

// Delete confirmation
pub const CONFIRM_DIALOG: Selector = css(".ui-dialog");
pub const CONFIRM_BUTTON: Selector = xpath("//button[contains(text(), 'OK')]");
