//! Weather code lookup shared by every component that renders conditions

/// Every weather code with a dedicated description
pub const KNOWN_CODES: [i64; 21] = [
    0, 1, 2, 3, 45, 48, 51, 53, 55, 61, 63, 65, 71, 73, 75, 80, 81, 82, 95, 96, 99,
];

/// Text used for codes outside the table
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Convert an Open-Meteo weather code to a human-readable description
#[must_use]
pub fn condition_text(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_CONDITION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "Clear sky")]
    #[case(1, "Mainly clear")]
    #[case(2, "Partly cloudy")]
    #[case(3, "Overcast")]
    #[case(45, "Foggy")]
    #[case(48, "Depositing rime fog")]
    #[case(51, "Light drizzle")]
    #[case(53, "Moderate drizzle")]
    #[case(55, "Dense drizzle")]
    #[case(61, "Slight rain")]
    #[case(63, "Moderate rain")]
    #[case(65, "Heavy rain")]
    #[case(71, "Slight snow")]
    #[case(73, "Moderate snow")]
    #[case(75, "Heavy snow")]
    #[case(80, "Slight rain showers")]
    #[case(81, "Moderate rain showers")]
    #[case(82, "Violent rain showers")]
    #[case(95, "Thunderstorm")]
    #[case(96, "Thunderstorm with slight hail")]
    #[case(99, "Thunderstorm with heavy hail")]
    fn known_codes_have_exact_text(#[case] code: i64, #[case] expected: &str) {
        assert_eq!(condition_text(code), expected);
    }

    #[rstest]
    #[case(-1)]
    #[case(4)]
    #[case(56)]
    #[case(77)]
    #[case(86)]
    #[case(100)]
    #[case(i64::MAX)]
    fn other_codes_are_unknown(#[case] code: i64) {
        assert_eq!(condition_text(code), "Unknown");
    }

    #[test]
    fn every_listed_code_is_mapped() {
        for code in KNOWN_CODES {
            assert_ne!(condition_text(code), UNKNOWN_CONDITION, "code {code}");
        }
        let mapped = (-10..=200)
            .filter(|c| condition_text(*c) != UNKNOWN_CONDITION)
            .count();
        assert_eq!(mapped, KNOWN_CODES.len());
    }
}
