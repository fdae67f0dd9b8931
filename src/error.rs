use std::convert::From;
use std::error;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    InvalidDateOrdering,
    InvalidCalendarComputation,
    ConfigParse,
    ParseError,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }

    pub fn with_msg(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::ErrorKind> for Error {
    fn from(kind: io::ErrorKind) -> Error {
        Error::from(io::Error::from(kind))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(parse_error: chrono::ParseError) -> Error {
        Error::new(
            ErrorKind::ParseError,
            format!("Could not parse date: {}", parse_error).as_str(),
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(toml_error: toml::de::Error) -> Error {
        Error::new(ErrorKind::ConfigParse, &toml_error.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        if let ErrorKind::IOError(err) = err.kind {
            err
        } else {
            let message = match err.message {
                Some(msg) => msg,
                None => err.kind.as_str(),
            };
            io::Error::new(io::ErrorKind::InvalidInput, message)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::InvalidDateOrdering => "start date is later than end date".to_owned(),
            ErrorKind::InvalidCalendarComputation => {
                "calendar could not compute date components".to_owned()
            }
            ErrorKind::ConfigParse => "invalid configuration".to_owned(),
            ErrorKind::ParseError => "invalid format".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = Error::new(ErrorKind::InvalidDateOrdering, "2017-08-05 > 2017-08-04");
        assert_eq!(
            err.to_string(),
            "start date is later than end date: 2017-08-05 > 2017-08-04"
        );

        let err = Error::from(ErrorKind::InvalidCalendarComputation);
        assert_eq!(err.to_string(), "calendar could not compute date components");
    }

    #[test]
    fn converts_into_io_error() {
        let err: io::Error = Error::new(ErrorKind::ConfigParse, "bad key").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = Error::from(io::ErrorKind::NotFound).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = Error::from(ErrorKind::InvalidDateOrdering).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "start date is later than end date");
    }

    #[test]
    fn date_parse_errors() {
        let parse_error = chrono::NaiveDate::parse_from_str("2017-13-01", "%Y-%m-%d").unwrap_err();
        let err = Error::from(parse_error);
        assert!(matches!(err.kind, ErrorKind::ParseError));
        assert!(err.to_string().starts_with("invalid format: Could not parse date"));
    }
}
