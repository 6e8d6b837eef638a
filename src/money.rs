// region:    --- Imports
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
// endregion: --- Imports

// region:    --- Amount

/// 정수 센트(1/100 단위) 고정 소수점 금액
/// 부동 소수점은 비교/반올림 오차가 있으므로 사용하지 않음
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[sqlx(transparent)]
pub struct Amount(i64);

// 정수부 최대 자릿수 (DecimalField(max_digits=10, decimal_places=2)에 대응)
const MAX_INTEGER_DIGITS: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum AmountParseError {
    #[error("금액 형식이 올바르지 않습니다.")]
    Malformed,
    #[error("소수점 이하는 2자리까지만 허용됩니다.")]
    TooManyFractionDigits,
    #[error("금액이 허용 범위를 벗어났습니다.")]
    OutOfRange,
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// 센트 단위 값으로 생성
    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// "10", "10.5", "10.50" 형태만 허용
    /// 음수, 소수점 3자리 이상, 숫자가 아닌 입력은 거부
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (s, None),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::Malformed);
        }
        if int_part.len() > MAX_INTEGER_DIGITS {
            return Err(AmountParseError::OutOfRange);
        }

        let mut cents = int_part
            .parse::<i64>()
            .map_err(|_| AmountParseError::Malformed)?
            * 100;

        if let Some(frac) = frac_part {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountParseError::Malformed);
            }
            if frac.len() > 2 {
                return Err(AmountParseError::TooManyFractionDigits);
            }
            let mut frac_cents = frac
                .parse::<i64>()
                .map_err(|_| AmountParseError::Malformed)?;
            if frac.len() == 1 {
                frac_cents *= 10;
            }
            cents += frac_cents;
        }

        Ok(Amount(cents))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// JSON에서는 항상 "10.50" 형태의 문자열로 주고받음
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// endregion: --- Amount

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fraction() {
        assert_eq!("10".parse::<Amount>().unwrap(), Amount::from_cents(1000));
        assert_eq!("10.5".parse::<Amount>().unwrap(), Amount::from_cents(1050));
        assert_eq!("10.50".parse::<Amount>().unwrap(), Amount::from_cents(1050));
        assert_eq!("0".parse::<Amount>().unwrap(), Amount::ZERO);
        assert_eq!("0.07".parse::<Amount>().unwrap(), Amount::from_cents(7));
    }

    #[test]
    fn reject_malformed_input() {
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Malformed));
        assert_eq!("-1".parse::<Amount>(), Err(AmountParseError::Malformed));
        assert_eq!("10.".parse::<Amount>(), Err(AmountParseError::Malformed));
        assert_eq!(".5".parse::<Amount>(), Err(AmountParseError::Malformed));
        assert_eq!("abc".parse::<Amount>(), Err(AmountParseError::Malformed));
        assert_eq!("1,000".parse::<Amount>(), Err(AmountParseError::Malformed));
        assert_eq!(
            "10.123".parse::<Amount>(),
            Err(AmountParseError::TooManyFractionDigits)
        );
        assert_eq!(
            "123456789".parse::<Amount>(),
            Err(AmountParseError::OutOfRange)
        );
    }

    #[test]
    fn display_round_trip() {
        for s in ["10.00", "10.50", "0.07", "99999999.99"] {
            assert_eq!(s.parse::<Amount>().unwrap().to_string(), s);
        }
        assert_eq!("10.5".parse::<Amount>().unwrap().to_string(), "10.50");
    }

    #[test]
    fn ordering_is_numeric() {
        let low: Amount = "9.99".parse().unwrap();
        let high: Amount = "10.00".parse().unwrap();
        assert!(low < high);
    }
}
// endregion: --- Tests
