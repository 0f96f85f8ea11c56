use crate::errors::IngestError;

/// Temperatures carried by one device line, before a timestamp is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub reactor: f64,
    pub vapor: f64,
}

/// Parse a `reactor;vapor` line.
pub fn parse_line(line: &str) -> Result<Reading, IngestError> {
    let fields: Vec<&str> = line.trim().split(';').collect();
    if fields.len() != 2 {
        return Err(IngestError::FieldCount(fields.len()));
    }

    Ok(Reading {
        reactor: parse_field(fields[0], 0)?,
        vapor: parse_field(fields[1], 1)?,
    })
}

/// Parse a line as it came off the link, rejecting bytes that are not UTF-8.
pub fn parse_raw_line(bytes: &[u8]) -> Result<Reading, IngestError> {
    let line = std::str::from_utf8(bytes).map_err(|_| IngestError::Encoding)?;
    parse_line(line)
}

fn parse_field(raw: &str, index: usize) -> Result<f64, IngestError> {
    let not_numeric = || IngestError::NotNumeric {
        index,
        value: raw.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| not_numeric())?;
    if !value.is_finite() {
        return Err(not_numeric());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_fields() {
        let reading = parse_line("251.3;27.8\r\n").unwrap();
        assert_eq!(reading, Reading { reactor: 251.3, vapor: 27.8 });

        let reading = parse_line(" 240 ; 25.0 ").unwrap();
        assert_eq!(reading.reactor, 240.0);
        assert_eq!(reading.vapor, 25.0);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(parse_line("251.3"), Err(IngestError::FieldCount(1)));
        assert_eq!(parse_line("1;2;3"), Err(IngestError::FieldCount(3)));
        assert_eq!(parse_line(""), Err(IngestError::FieldCount(1)));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert_eq!(
            parse_line("251.3;hot"),
            Err(IngestError::NotNumeric { index: 1, value: "hot".into() })
        );
        assert!(matches!(
            parse_line(";27.8"),
            Err(IngestError::NotNumeric { index: 0, .. })
        ));
        assert!(matches!(
            parse_line("NaN;27.8"),
            Err(IngestError::NotNumeric { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(parse_raw_line(b"25\xff;1"), Err(IngestError::Encoding));
        assert!(parse_raw_line(b"25;1\n").is_ok());
    }
}
