//! pt-BR display formatting for documents and e-mails

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::finance::round_money;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// `1234.5` -> `1.234,50`
pub fn brl(amount: Decimal) -> String {
    let rounded = round_money(amount, 2);
    let negative = rounded < Decimal::ZERO;
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{},{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// `dd/mm/yyyy`
pub fn date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `2025-03` -> `Março/2025`; anything unparseable is returned as is
pub fn month_label(reference_month: &str) -> String {
    let Some((year, month)) = reference_month.split_once('-') else {
        return reference_month.to_string();
    };
    match month.parse::<usize>() {
        Ok(m @ 1..=12) => format!("{}/{}", MONTH_NAMES[m - 1], year),
        _ => reference_month.to_string(),
    }
}

/// Rate in percent without trailing zeros: `7.50` -> `7.5`
pub fn percent(rate: Decimal) -> String {
    rate.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_brl_grouping() {
        assert_eq!(brl(dec!(0)), "0,00");
        assert_eq!(brl(dec!(999.9)), "999,90");
        assert_eq!(brl(dec!(1234.5)), "1.234,50");
        assert_eq!(brl(dec!(1234567.891)), "1.234.567,89");
        assert_eq!(brl(dec!(-2500)), "-2.500,00");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("2025-03"), "Março/2025");
        assert_eq!(month_label("2025-12"), "Dezembro/2025");
        assert_eq!(month_label("2025-13"), "2025-13");
        assert_eq!(month_label("março"), "março");
    }

    #[test]
    fn test_dates_and_rates() {
        assert_eq!(date_br(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()), "05/03/2025");
        assert_eq!(percent(dec!(7.50)), "7.5");
        assert_eq!(percent(dec!(15.00)), "15");
    }
}
