use log::debug;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("select at least one part!")]
    NoPartsSelected,
    #[error("invalid price {0:?}")]
    InvalidPrice(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Cpu,
    Gpu,
    Ram,
    Storage,
    Psu,
    Motherboard,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Part::Cpu => "CPU",
            Part::Gpu => "GPU",
            Part::Ram => "RAM",
            Part::Storage => "Storage",
            Part::Psu => "PSU",
            Part::Motherboard => "Motherboard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartChoice {
    pub part: Part,
    pub label: String,
    pub price: i64,
}

impl PartChoice {
    /// Parses `LABEL=PRICE` or a bare `PRICE`. Anything after a "(" in the
    /// label is dropped, so "Ryzen 5 5600 (250,000 ks)=250000" reads as "Ryzen 5 5600".
    pub fn parse(part: Part, raw: &str) -> Result<PartChoice, CalculatorError> {
        let (label, price) = match raw.rsplit_once('=') {
            Some((label, price)) => (short_label(label), price),
            None => (part.to_string(), raw),
        };
        let price = price
            .trim()
            .replace(',', "")
            .parse::<i64>()
            .map_err(|_| CalculatorError::InvalidPrice(price.trim().to_string()))?;
        Ok(PartChoice { part, label, price })
    }
}

fn short_label(label: &str) -> String {
    label.split('(').next().unwrap_or_default().trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTier {
    Budget,
    MidRange,
    HighEnd,
    Ultra,
}

impl BuildTier {
    pub fn from_total(total: i64) -> BuildTier {
        if total < 500_000 {
            BuildTier::Budget
        } else if total < 1_200_000 {
            BuildTier::MidRange
        } else if total < 2_500_000 {
            BuildTier::HighEnd
        } else {
            BuildTier::Ultra
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildTier::Budget => "💚 Budget Build",
            BuildTier::MidRange => "💙 Mid-range Build",
            BuildTier::HighEnd => "💜 High-end Build",
            BuildTier::Ultra => "🔥 Ultra / Enthusiast Build",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEstimate {
    pub total: i64,
    pub breakdown: Vec<PartChoice>,
    pub tier: BuildTier,
}

pub fn estimate(choices: &[PartChoice]) -> Result<BuildEstimate, CalculatorError> {
    let breakdown: Vec<PartChoice> = choices.iter().filter(|c| c.price > 0).cloned().collect();
    if breakdown.is_empty() {
        return Err(CalculatorError::NoPartsSelected);
    }
    let total: i64 = breakdown.iter().map(|c| c.price).sum();
    let tier = BuildTier::from_total(total);
    debug!("[Calc] {} part(s), total {} -> {:?}", breakdown.len(), total, tier);
    Ok(BuildEstimate {
        total,
        breakdown,
        tier,
    })
}

/// `1250000` -> `"1,250,000 ks"`.
pub fn format_kyat(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{} ks", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(part: Part, price: i64) -> PartChoice {
        PartChoice {
            part,
            label: part.to_string(),
            price,
        }
    }

    #[test]
    fn sums_only_selected_parts() {
        let estimate = estimate(&[
            choice(Part::Cpu, 250_000),
            choice(Part::Gpu, 0),
            choice(Part::Ram, 90_000),
        ])
        .unwrap();
        assert_eq!(estimate.total, 340_000);
        assert_eq!(estimate.breakdown.len(), 2);
        assert_eq!(estimate.tier, BuildTier::Budget);
    }

    #[test]
    fn nothing_selected_is_an_error() {
        assert_eq!(
            estimate(&[choice(Part::Cpu, 0)]),
            Err(CalculatorError::NoPartsSelected)
        );
        assert_eq!(estimate(&[]), Err(CalculatorError::NoPartsSelected));
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(BuildTier::from_total(499_999), BuildTier::Budget);
        assert_eq!(BuildTier::from_total(500_000), BuildTier::MidRange);
        assert_eq!(BuildTier::from_total(1_200_000), BuildTier::HighEnd);
        assert_eq!(BuildTier::from_total(2_500_000), BuildTier::Ultra);
    }

    #[test]
    fn parses_labelled_and_bare_prices() {
        let labelled = PartChoice::parse(Part::Cpu, "Ryzen 5 5600 (250,000 ks)=250,000").unwrap();
        assert_eq!(labelled.label, "Ryzen 5 5600");
        assert_eq!(labelled.price, 250_000);

        let bare = PartChoice::parse(Part::Psu, "85000").unwrap();
        assert_eq!(bare.label, "PSU");
        assert_eq!(bare.price, 85_000);

        assert_eq!(
            PartChoice::parse(Part::Ram, "cheap"),
            Err(CalculatorError::InvalidPrice("cheap".to_string()))
        );
    }

    #[test]
    fn kyat_formatting() {
        assert_eq!(format_kyat(0), "0 ks");
        assert_eq!(format_kyat(999), "999 ks");
        assert_eq!(format_kyat(1_000), "1,000 ks");
        assert_eq!(format_kyat(1_250_000), "1,250,000 ks");
    }
}
