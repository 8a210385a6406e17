//! `a=fmtp` line handling
//!
//! Format: `a=fmtp:<payload> <key>[=<value>];<key>[=<value>]...`

use std::fmt;

use super::SupportedPrefix;

/// Parameter key enabling stereo reception
pub const STEREO: &str = "stereo";
/// Parameter key announcing stereo transmission
pub const SPROP_STEREO: &str = "sprop-stereo";

/// A borrowed view over an `a=fmtp:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtpLine<'a> {
    pub payload: &'a str,
    pub parameters: &'a str,
}

impl<'a> FmtpLine<'a> {
    /// Split an `a=fmtp:` line into payload and raw parameter string.
    ///
    /// Returns `None` for any other line or when the payload is missing.
    pub fn parse(line: &'a str) -> Option<Self> {
        let value = SupportedPrefix::Fmtp.strip(line)?;
        let (payload, parameters) = match value.split_once(' ') {
            Some((payload, parameters)) => (payload, parameters),
            None => (value, ""),
        };
        if payload.is_empty() {
            return None;
        }
        Some(Self { payload, parameters })
    }
}

/// Ordered list of fmtp `key[=value]` parameters
///
/// Encounter order is kept; keys added later are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FmtpParameters {
    entries: Vec<(String, Option<String>)>,
}

impl FmtpParameters {
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), Some(value.trim().to_string())),
                None => (segment.to_string(), None),
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set `key=value`, returning true if the list changed
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) if existing.as_deref() == Some(value) => false,
            Some((_, existing)) => {
                *existing = Some(value.to_string());
                true
            }
            None => {
                self.entries.push((key.to_string(), Some(value.to_string())));
                true
            }
        }
    }

    /// Whether the remote side declared it can receive stereo
    pub fn is_stereo(&self) -> bool {
        self.get(STEREO) == Some("1")
    }

    /// Make sure both `stereo=1` and `sprop-stereo=1` are present.
    ///
    /// Returns true if anything had to be inserted or overwritten.
    pub fn ensure_stereo(&mut self) -> bool {
        let stereo = self.set(STEREO, "1");
        let sprop = self.set(SPROP_STEREO, "1");
        stereo || sprop
    }
}

impl fmt::Display for FmtpParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }
            match value {
                Some(value) => write!(f, "{}={}", key, value)?,
                None => f.write_str(key)?,
            }
        }
        Ok(())
    }
}

/// Rewrite an fmtp line so it carries stereo parameters.
///
/// Returns `None` when the line is already compliant.
pub fn stereo_line(fmtp: &FmtpLine<'_>) -> Option<String> {
    let mut parameters = FmtpParameters::parse(fmtp.parameters);
    if !parameters.ensure_stereo() {
        return None;
    }
    Some(format!(
        "{}{} {}",
        SupportedPrefix::Fmtp.as_str(),
        fmtp.payload,
        parameters
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fmtp_line() {
        let line = FmtpLine::parse("a=fmtp:111 minptime=10;useinbandfec=1").unwrap();
        assert_eq!(line.payload, "111");
        assert_eq!(line.parameters, "minptime=10;useinbandfec=1");

        let bare = FmtpLine::parse("a=fmtp:101").unwrap();
        assert_eq!(bare.payload, "101");
        assert_eq!(bare.parameters, "");

        assert!(FmtpLine::parse("a=rtpmap:111 opus/48000/2").is_none());
        assert!(FmtpLine::parse("a=fmtp: stereo=1").is_none());
    }

    #[test]
    fn test_parameters_keep_order() {
        let params = FmtpParameters::parse("maxaveragebitrate=510000;minptime=10;;useinbandfec=1");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("minptime"), Some("10"));
        assert_eq!(params.to_string(), "maxaveragebitrate=510000;minptime=10;useinbandfec=1");
    }

    #[test]
    fn test_valueless_keys() {
        let params = FmtpParameters::parse("0-16");
        assert!(params.contains("0-16"));
        assert_eq!(params.get("0-16"), None);
        assert_eq!(params.to_string(), "0-16");
    }

    #[test]
    fn test_ensure_stereo_appends_missing() {
        let mut params = FmtpParameters::parse("minptime=10;useinbandfec=1");
        assert!(params.ensure_stereo());
        assert_eq!(params.to_string(), "minptime=10;useinbandfec=1;stereo=1;sprop-stereo=1");
        assert!(!params.ensure_stereo());
    }

    #[test]
    fn test_ensure_stereo_overwrites_in_place() {
        let mut params = FmtpParameters::parse("stereo=0;minptime=10;sprop-stereo=1");
        assert!(params.ensure_stereo());
        assert_eq!(params.to_string(), "stereo=1;minptime=10;sprop-stereo=1");
    }

    #[test]
    fn test_stereo_line() {
        let line = FmtpLine::parse("a=fmtp:111 minptime=10;useinbandfec=1").unwrap();
        assert_eq!(
            stereo_line(&line).as_deref(),
            Some("a=fmtp:111 minptime=10;useinbandfec=1;stereo=1;sprop-stereo=1")
        );

        let compliant = FmtpLine::parse("a=fmtp:111 stereo=1;sprop-stereo=1").unwrap();
        assert_eq!(stereo_line(&compliant), None);
    }
}
