//! Best-effort battery percentage for status output.
//!
//! macOS shells out to `pmset -g batt`; Linux reads
//! `/sys/class/power_supply`. Desktops without a battery report `None`.

/// Current battery charge as a percentage, if one can be determined.
pub fn battery_percentage() -> Option<u8> {
    #[cfg(target_os = "macos")]
    {
        let output = std::process::Command::new("pmset")
            .args(["-g", "batt"])
            .output()
            .ok()?;
        parse_pmset(&String::from_utf8_lossy(&output.stdout))
    }

    #[cfg(target_os = "linux")]
    {
        let entries = std::fs::read_dir("/sys/class/power_supply").ok()?;
        for entry in entries.flatten() {
            let kind = std::fs::read_to_string(entry.path().join("type")).unwrap_or_default();
            if kind.trim() != "Battery" {
                continue;
            }
            let capacity =
                std::fs::read_to_string(entry.path().join("capacity")).unwrap_or_default();
            if let Ok(pct) = capacity.trim().parse::<u8>() {
                return Some(pct.min(100));
            }
        }
        None
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Pull the first percentage out of `pmset -g batt` output.
#[cfg(any(target_os = "macos", test))]
fn parse_pmset(text: &str) -> Option<u8> {
    for line in text.lines() {
        let Some(pos) = line.find('%') else { continue };
        let before = &line[..pos];
        let num_start = before
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);
        if let Ok(pct) = before[num_start..].trim().parse::<u8>() {
            return Some(pct.min(100));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pmset_output() {
        let text = "Now drawing from 'Battery Power'\n \
                    -InternalBattery-0 (id=1234)\t87%; discharging; 4:32 remaining present: true";
        assert_eq!(parse_pmset(text), Some(87));
    }

    #[test]
    fn test_parse_pmset_no_battery() {
        assert_eq!(parse_pmset("Now drawing from 'AC Power'\n"), None);
        assert_eq!(parse_pmset(""), None);
    }
}
