//! # Redirect Request Parsing
//!
//! Turns the raw query parameters of an inbound request into a
//! [`ParsedRequest`], or explains why the request is not one of ours.

use std::collections::BTreeMap;
use std::fmt;

/// Query parameter that marks a redirect request.
pub const REDIRECT_TRIGGER: &str = "trustedlogin";

/// Parameters every redirect request must carry.
pub const REQUIRED_ARGS: [&str; 3] = ["action", "provider", "ak"];

/// Raw request parameters, as received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedirectRequest {
    params: BTreeMap<String, String>,
}

impl RedirectRequest {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Check the trigger and required arguments.
    pub fn parse(&self) -> Result<ParsedRequest, RequestSkip> {
        let trigger = self.get(REDIRECT_TRIGGER).ok_or(RequestSkip::NotTriggered)?;
        if trigger != "1" {
            return Err(RequestSkip::BadTrigger(sanitize(trigger)));
        }

        let mut values = Vec::with_capacity(REQUIRED_ARGS.len());
        for arg in REQUIRED_ARGS {
            match self.get(arg).map(sanitize) {
                Some(value) if !value.is_empty() => values.push(value),
                _ => return Err(RequestSkip::MissingArg(arg)),
            }
        }
        let ak = values.pop().unwrap_or_default();
        let provider = values.pop().unwrap_or_default();
        let action = values.pop().unwrap_or_default();

        Ok(ParsedRequest {
            action: RedirectAction::from(action.as_str()),
            provider,
            ak,
            page: self.get("page").map(sanitize).filter(|p| !p.is_empty()),
        })
    }
}

/// What the request asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedirectAction {
    /// `ak` is an access key to resolve
    AccessKeyLogin,
    /// `ak` is already a secret id
    SupportRedirect,
    Other(String),
}

impl From<&str> for RedirectAction {
    fn from(action: &str) -> Self {
        match action {
            "accesskey_login" => RedirectAction::AccessKeyLogin,
            "support_redirect" => RedirectAction::SupportRedirect,
            other => RedirectAction::Other(other.to_owned()),
        }
    }
}

/// A well-formed redirect request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRequest {
    pub action: RedirectAction,
    pub provider: String,
    pub ak: String,
    /// Admin page the request was made from, if any
    pub page: Option<String>,
}

/// Why a request was ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestSkip {
    NotTriggered,
    BadTrigger(String),
    MissingArg(&'static str),
}

impl fmt::Display for RequestSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSkip::NotTriggered => f.write_str("no redirect trigger"),
            RequestSkip::BadTrigger(value) => {
                write!(f, "Incorrect parameter for trustedlogin provided: {value}")
            }
            RequestSkip::MissingArg(arg) => write!(f, "Required arg {arg} missing."),
        }
    }
}

/// Trim and drop control characters.
pub(crate) fn sanitize(value: &str) -> String {
    value.trim().chars().filter(|c| !c.is_control()).collect()
}
