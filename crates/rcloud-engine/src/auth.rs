//! Login state machine.
//!
//! `AwaitingCredentials -> Submitting -> {Authenticated, Rejected}`; a rejected
//! cycle starts over from the login page, at most [`MAX_LOGIN_ATTEMPTS`] times.

use crate::cli::{OutputHandlers, Prompt};
use crate::config::{Credentials, RunConfig};
use crate::driver::{DriverError, SessionDriver};
use crate::error::RunError;
use crate::overlay::dismiss_consent_overlay;
use crate::retry::{RetryPolicy, with_retry};
use crate::site;
use rcloud_common::protocol::WaitCondition;
use std::fmt;
use std::io;
use tracing::{debug, info};

pub const MAX_LOGIN_ATTEMPTS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    AwaitingCredentials,
    Submitting,
    Authenticated,
    Rejected,
}

/// Why a single login cycle did not authenticate.
#[derive(Debug)]
enum CycleError {
    /// The dashboard never appeared: the site refused the credentials.
    Rejected,
    /// Something in the browser went wrong during the cycle.
    Driver(DriverError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Rejected => f.write_str("credentials rejected"),
            CycleError::Driver(e) => write!(f, "{}", e),
        }
    }
}

impl From<DriverError> for CycleError {
    fn from(e: DriverError) -> Self {
        CycleError::Driver(e)
    }
}

/// A cycle that ended without needing another attempt.
enum CycleEnd {
    Authenticated,
    /// Reading credentials failed; retrying cannot help.
    Aborted(io::Error),
}

struct LoginSession<'a, P: Prompt + ?Sized> {
    credentials: Credentials,
    prompt: &'a mut P,
    config: &'a RunConfig,
    output: OutputHandlers,
    state: AuthState,
}

impl<P: Prompt + ?Sized> LoginSession<'_, P> {
    fn transition(&mut self, next: AuthState) {
        debug!("auth: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn cycle<D: SessionDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        attempt: u32,
    ) -> Result<CycleEnd, CycleError> {
        self.transition(AuthState::AwaitingCredentials);
        info!("Login attempt {}/{}", attempt, MAX_LOGIN_ATTEMPTS);

        let result = self.submit(driver).await;
        match result {
            Ok(Some(end)) => Ok(end),
            Ok(None) => {
                self.transition(AuthState::Rejected);
                (self.output.out)("Login failed. Please try again.");
                // Supplied credentials were wrong; ask for fresh ones next time.
                self.credentials.clear();
                Err(CycleError::Rejected)
            }
            Err(e) => {
                self.transition(AuthState::Rejected);
                Err(e.into())
            }
        }
    }

    /// `Ok(None)` means the site answered but did not let us in.
    async fn submit<D: SessionDriver + ?Sized>(
        &mut self,
        driver: &mut D,
    ) -> Result<Option<CycleEnd>, DriverError> {
        driver.navigate(self.config.site.login.as_str()).await?;
        dismiss_consent_overlay(driver, self.config.timing.overlay_wait()).await;

        if self.credentials.user.is_empty() {
            match self.prompt.ask("Username").await {
                Ok(user) => self.credentials.user = user,
                Err(e) => return Ok(Some(CycleEnd::Aborted(e))),
            }
        }
        if self.credentials.password.is_empty() {
            match self.prompt.ask("Password").await {
                Ok(password) => self.credentials.password = password,
                Err(e) => return Ok(Some(CycleEnd::Aborted(e))),
            }
        }

        let user_field = driver.find(&site::LOGIN_USER_FIELD).await?;
        driver.fill(&user_field, &self.credentials.user).await?;
        let password_field = driver.find(&site::LOGIN_PASSWORD_FIELD).await?;
        driver.fill(&password_field, &self.credentials.password).await?;

        self.transition(AuthState::Submitting);
        driver.press_enter(&password_field).await?;

        let marker = WaitCondition::Present(site::DASHBOARD_MARKER);
        match driver
            .wait_for(&marker, self.config.timing.login_wait())
            .await
        {
            Ok(_) => {
                self.transition(AuthState::Authenticated);
                Ok(Some(CycleEnd::Authenticated))
            }
            Err(DriverError::Timeout { .. }) | Err(DriverError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
    pub attempts: u32,
}

/// Logs in, prompting for blank credentials, with up to four cycles.
pub async fn authenticate<D, P>(
    driver: &mut D,
    prompt: &mut P,
    config: &RunConfig,
    output: OutputHandlers,
) -> Result<Authenticated, RunError>
where
    D: SessionDriver + ?Sized,
    P: Prompt + ?Sized,
{
    let mut session = LoginSession {
        credentials: config.credentials.clone(),
        prompt,
        config,
        output,
        state: AuthState::AwaitingCredentials,
    };
    let mut attempts = 0;

    let outcome = with_retry(
        &RetryPolicy::immediate(MAX_LOGIN_ATTEMPTS),
        "login",
        driver,
        async |driver: &mut D, attempt: u32| {
            attempts = attempt;
            session.cycle(driver, attempt).await
        },
        async |_: &mut D| {},
    )
    .await;

    match outcome {
        Ok(CycleEnd::Authenticated) => {
            (output.out)("Login successful.");
            Ok(Authenticated { attempts })
        }
        Ok(CycleEnd::Aborted(e)) => Err(RunError::Prompt(e)),
        Err(exhausted) => Err(RunError::AuthenticationExhausted {
            attempts: exhausted.attempts,
        }),
    }
}
