use serde::{Deserialize, Serialize};
use std::fmt;

const MASK: &str = "********";

/// Who holds a desk, hidden from formatted output.
///
/// `{}` and `{:?}` both print a fixed mask so reservation logs never carry a
/// student id. Serde sees through the wrapper: events sent to subscribers
/// keep the real value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> Masked<T> {
    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<&str> for Masked<String> {
    fn from(value: &str) -> Self {
        Masked(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let user = Masked::from("student-42");
        assert_eq!(format!("{}", user), "********");
        assert_eq!(format!("{:?}", user), "********");
        assert_eq!(user.inner(), "student-42");
    }

    #[test]
    fn test_masked_serializes_real_value() {
        let user = Masked::from("student-42");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"student-42\"");

        let back: Masked<String> = serde_json::from_str("\"student-7\"").unwrap();
        assert_eq!(back.into_inner(), "student-7");
    }
}
