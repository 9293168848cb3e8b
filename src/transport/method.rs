use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::RunnerError;

/// The HTTP methods a runner can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// GET and DELETE carry query parameters; POST and PUT carry a body.
    pub fn sends_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RunnerError;

    /// Case-insensitive. Empty and unknown names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                if s.is_empty() {
                    RunnerError::InvalidArgument("method is empty".to_string())
                } else {
                    RunnerError::InvalidArgument(format!("method {s} not supported or invalid"))
                }
            })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("PUT".parse::<Method>().unwrap(), Method::Put);
        assert_eq!("dElEtE".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn test_parse_rejects_unsupported() {
        for name in ["", "PATCH", "HEAD", "GETS", " GET"] {
            let err = name.parse::<Method>().unwrap_err();
            assert!(err.is_invalid_argument(), "{name:?} gave {err:?}");
        }
    }

    #[test]
    fn test_display_round_trips() {
        for method in Method::ALL {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }
    }
}
