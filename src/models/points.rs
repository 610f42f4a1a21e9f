// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Point balances and costs.
//!
//! The backend stores points as DECIMAL(10,2) and, depending on the JSON
//! encoder, emits them either as numbers or as decimal strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A point amount. May carry a fractional part.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Points(pub f64);

impl Points {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Admin display: integers without decimals, otherwise at most two
    /// fraction digits, comma-grouped (`1,234.5`).
    pub fn format_precise(self) -> String {
        if !self.0.is_finite() {
            return "0".to_string();
        }
        let rounded = (self.0 * 100.0).round() / 100.0;
        if rounded.fract() == 0.0 {
            return group_thousands(rounded as i64);
        }
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let int_value: i64 = int_part.parse().unwrap_or(0);
        let frac = frac_part.trim_end_matches('0');
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{}{}.{}", sign, group_thousands(int_value), frac)
    }

    /// Consumer display: always a whole number, floored, comma-grouped.
    pub fn format_whole(self) -> String {
        if !self.0.is_finite() {
            return "0".to_string();
        }
        group_thousands(self.0.floor() as i64)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_precise())
    }
}

impl From<f64> for Points {
    fn from(v: f64) -> Self {
        Points(v)
    }
}

impl From<u32> for Points {
    fn from(v: u32) -> Self {
        Points(v as f64)
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Null(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Points(n)),
            // Unparsable text compares as "cannot afford", same as NaN.
            Raw::Text(s) => Ok(Points(s.trim().parse().unwrap_or(f64::NAN))),
            Raw::Null(()) => Ok(Points(0.0)),
        }
    }
}

/// Insert comma separators every three digits.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
