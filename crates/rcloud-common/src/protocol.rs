use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// How an element is located on the page.
///
/// Selectors are `Cow` so that the fixed site contract can live in `const`s
/// while configuration can still build owned ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selector {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
}

impl Selector {
    pub fn css(value: impl Into<String>) -> Self {
        Selector::Css(Cow::Owned(value.into()))
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Selector::XPath(Cow::Owned(value.into()))
    }

    pub fn value(&self) -> &str {
        match self {
            Selector::Css(v) | Selector::XPath(v) => v,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(v) => write!(f, "css `{}`", v),
            Selector::XPath(v) => write!(f, "xpath `{}`", v),
        }
    }
}

/// Opaque reference to a live element in the browser session.
///
/// A handle is only meaningful to the driver that issued it and only for the
/// page epoch it was issued in. Navigating starts a new epoch; older handles
/// then fail with `DriverError::ElementStale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: u64,
    epoch: u32,
}

impl ElementHandle {
    pub fn new(id: u64, epoch: u32) -> Self {
        Self { id, epoch }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.id, self.epoch)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Zero-area boxes belong to hidden or placeholder nodes.
    pub fn is_collapsed(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// Element exists in the DOM.
    Present(Selector),
    /// Element exists and is rendered visible.
    Visible(Selector),
}

impl WaitCondition {
    pub fn selector(&self) -> &Selector {
        match self {
            WaitCondition::Present(s) | WaitCondition::Visible(s) => s,
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::Present(s) => write!(f, "presence of {}", s),
            WaitCondition::Visible(s) => write!(f, "visibility of {}", s),
        }
    }
}

/// Point-in-time copy of the browser's cookies, name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookies(BTreeMap<String, String>);

impl SessionCookies {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the snapshot as a `Cookie` request header value.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionCookies {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
