//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").expect("email pattern is a valid regex")
});

/// 电子邮箱（构造即校验）
///
/// 仅做 `local@domain` 的简单形状校验，不做投递性检查。
///
/// # 示例
///
/// ```
/// use vassar_domain::value_object::Email;
///
/// let email = Email::new("dilsia@email.com").unwrap();
/// assert_eq!(email.as_str(), "dilsia@email.com");
///
/// assert!(Email::new("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let email = Self(value.into());
        email.validate()?;
        Ok(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if EMAIL_PATTERN.is_match(&self.0) {
            Ok(())
        } else {
            Err(DomainError::InvalidValue {
                reason: format!("invalid email address: {}", self.0),
            })
        }
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 世代后缀（如 "IV"/"V"），用于区分同名亲属
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Postnomial {
    #[default]
    None,
    Jr,
    Sr,
    II,
    III,
    IV,
    V,
    VI,
}

impl Postnomial {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Postnomial::None => "NONE",
            Postnomial::Jr => "JR",
            Postnomial::Sr => "SR",
            Postnomial::II => "II",
            Postnomial::III => "III",
            Postnomial::IV => "IV",
            Postnomial::V => "V",
            Postnomial::VI => "VI",
        }
    }

    /// `None` 与 `Some(NONE)` 在查询语义上等价，统一折叠为 `None`
    pub fn normalize(postnomial: Option<Postnomial>) -> Option<Postnomial> {
        match postnomial {
            None | Some(Postnomial::None) => None,
            other => other,
        }
    }
}

impl fmt::Display for Postnomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Postnomial {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().trim_end_matches('.').to_ascii_uppercase();
        match token.as_str() {
            "" | "NONE" => Ok(Postnomial::None),
            "JR" => Ok(Postnomial::Jr),
            "SR" => Ok(Postnomial::Sr),
            "II" => Ok(Postnomial::II),
            "III" => Ok(Postnomial::III),
            "IV" => Ok(Postnomial::IV),
            "V" => Ok(Postnomial::V),
            "VI" => Ok(Postnomial::VI),
            _ => Err(DomainError::InvalidValue {
                reason: format!("unknown postnomial: {s}"),
            }),
        }
    }
}

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            _ => Err(DomainError::InvalidValue {
                reason: format!("unknown gender: {s}"),
            }),
        }
    }
}

/// 唯一性键：(名, 姓, 出生日期)
///
/// 存储中任意两条人员记录的该三元组都不相同。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonKey {
    pub first_name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
}

impl PersonKey {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birthdate: NaiveDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthdate,
        }
    }
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.birthdate)
    }
}

/// 按姓名查找的键，后缀可选
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
    pub postnomial: Option<Postnomial>,
}

impl PersonName {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postnomial: Option<Postnomial>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postnomial: Postnomial::normalize(postnomial),
        }
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.postnomial {
            Some(p) => write!(f, "{} {} {}", self.first_name, self.last_name, p),
            None => write!(f, "{} {}", self.first_name, self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_simple_addresses() {
        for ok in [
            "benjamin.harrison.iv@email.com",
            "a+b@x",
            "mary_ann-harrison@example.org",
        ] {
            assert!(Email::new(ok).is_ok(), "{ok} should be valid");
        }
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        for bad in ["not-an-email", "@email.com", "a b@email.com", "dilsia@"] {
            match Email::new(bad) {
                Err(DomainError::InvalidValue { reason }) => assert!(reason.contains(bad)),
                other => panic!("{bad} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn email_serde_validates_on_deserialize() {
        let ok: Email = serde_json::from_str("\"oliver.harrison@email.com\"").unwrap();
        assert_eq!(ok.as_str(), "oliver.harrison@email.com");
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"oliver.harrison@email.com\"");

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }

    #[test]
    fn postnomial_tokens() {
        assert_eq!(Postnomial::default(), Postnomial::None);
        assert_eq!(serde_json::to_string(&Postnomial::IV).unwrap(), "\"IV\"");
        assert_eq!(serde_json::to_string(&Postnomial::None).unwrap(), "\"NONE\"");
        assert_eq!(serde_json::to_string(&Postnomial::Jr).unwrap(), "\"JR\"");

        let p: Postnomial = serde_json::from_str("\"V\"").unwrap();
        assert_eq!(p, Postnomial::V);

        assert_eq!("iv".parse::<Postnomial>().unwrap(), Postnomial::IV);
        assert_eq!("Jr.".parse::<Postnomial>().unwrap(), Postnomial::Jr);
        assert_eq!("".parse::<Postnomial>().unwrap(), Postnomial::None);
        assert!("XIV".parse::<Postnomial>().is_err());
    }

    #[test]
    fn postnomial_none_normalizes_to_absent() {
        assert_eq!(Postnomial::normalize(None), None);
        assert_eq!(Postnomial::normalize(Some(Postnomial::None)), None);
        assert_eq!(
            Postnomial::normalize(Some(Postnomial::V)),
            Some(Postnomial::V)
        );

        let a = PersonName::new("Oliver", "Harrison", None);
        let b = PersonName::new("Oliver", "Harrison", Some(Postnomial::None));
        assert_eq!(a, b);
    }

    #[test]
    fn gender_roundtrip_tokens() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"FEMALE\"");
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn person_key_display() {
        let key = PersonKey::new(
            "Benjamin",
            "Harrison",
            NaiveDate::from_ymd_opt(1693, 9, 11).unwrap(),
        );
        assert_eq!(key.to_string(), "Benjamin Harrison (1693-09-11)");
    }
}
