//! 人员（Person）实体与待登记的人员值
//!
//! - [`NewPerson`]：尚未分配标识的不可变值，构造时完成全部字段校验；
//! - [`Person`]：已写入存储的记录，携带存储分配的标识与解析后的关系标识。
//!
//! 关系只以标识引用其他人员，不嵌入副本，也不在内存中形成环形对象图。
//!
use bon::bon;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, PersonId};
use crate::error::{DomainError, DomainResult};
use crate::relationship::{Kinship, Relationship};
use crate::value_object::{Email, Gender, PersonKey, PersonName, Postnomial};

/// 人员的属性集合（不含标识与关系）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub first_name: String,
    pub last_name: String,
    pub postnomial: Postnomial,
    pub birthdate: NaiveDate,
    pub death_date: Option<NaiveDate>,
    pub email: Option<Email>,
    pub gender: Gender,
    pub occupation: Vec<String>,
    pub bio: String,
}

impl PersonProfile {
    pub fn key(&self) -> PersonKey {
        PersonKey::new(&self.first_name, &self.last_name, self.birthdate)
    }

    pub fn name(&self) -> PersonName {
        PersonName::new(&self.first_name, &self.last_name, Some(self.postnomial))
    }

    /// 姓名是否匹配；`postnomial` 为 `None` 时只比较名与姓
    pub fn matches_name(&self, first_name: &str, last_name: &str, postnomial: Option<Postnomial>) -> bool {
        self.first_name == first_name
            && self.last_name == last_name
            && postnomial.is_none_or(|p| p == self.postnomial)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::InvalidValue {
                reason: "first name is required".to_string(),
            });
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::InvalidValue {
                reason: "last name is required".to_string(),
            });
        }
        if let Some(death) = self.death_date {
            if death < self.birthdate {
                return Err(DomainError::InvalidValue {
                    reason: format!(
                        "death date {death} precedes birthdate {}",
                        self.birthdate
                    ),
                });
            }
        }
        Ok(())
    }
}

/// 待登记的人员（标识尚未分配）
///
/// 只能通过构建器创建，构建时即完成校验；校验失败不会触达存储。
///
/// # 示例
///
/// ```
/// use chrono::NaiveDate;
/// use vassar_domain::person::NewPerson;
/// use vassar_domain::value_object::{Gender, Postnomial};
///
/// let person = NewPerson::builder()
///     .first_name("Benjamin")
///     .last_name("Harrison")
///     .postnomial(Postnomial::IV)
///     .birthdate(NaiveDate::from_ymd_opt(1693, 9, 11).unwrap())
///     .email("benjamin.harrison.iv@email.com")
///     .gender(Gender::Male)
///     .build()
///     .unwrap();
/// assert_eq!(person.profile().first_name, "Benjamin");
///
/// let invalid = NewPerson::builder()
///     .first_name("Benjamin")
///     .last_name("Harrison")
///     .birthdate(NaiveDate::from_ymd_opt(1693, 9, 11).unwrap())
///     .email("not-an-email")
///     .gender(Gender::Male)
///     .build();
/// assert!(invalid.is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    profile: PersonProfile,
    parents: Vec<PersonId>,
    children: Vec<PersonId>,
    spouse: Option<PersonId>,
}

#[bon]
impl NewPerson {
    #[builder]
    pub fn new(
        #[builder(into)] first_name: String,
        #[builder(into)] last_name: String,
        postnomial: Option<Postnomial>,
        birthdate: NaiveDate,
        death_date: Option<NaiveDate>,
        #[builder(into)] email: Option<String>,
        gender: Gender,
        #[builder(default)] occupation: Vec<String>,
        #[builder(default, into)] bio: String,
        #[builder(default)] parents: Vec<PersonId>,
        #[builder(default)] children: Vec<PersonId>,
        spouse: Option<PersonId>,
    ) -> DomainResult<Self> {
        let email = email.map(Email::new).transpose()?;
        let profile = PersonProfile {
            first_name,
            last_name,
            postnomial: postnomial.unwrap_or_default(),
            birthdate,
            death_date,
            email,
            gender,
            occupation,
            bio,
        };
        profile.validate()?;
        Ok(Self {
            profile,
            parents,
            children,
            spouse,
        })
    }
}

impl NewPerson {
    pub fn profile(&self) -> &PersonProfile {
        &self.profile
    }

    pub fn key(&self) -> PersonKey {
        self.profile.key()
    }

    pub fn parents(&self) -> &[PersonId] {
        &self.parents
    }

    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    pub fn spouse(&self) -> Option<PersonId> {
        self.spouse
    }

    /// 所有被引用的人员标识（父母、子女、配偶）
    pub fn references(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.parents
            .iter()
            .chain(self.children.iter())
            .copied()
            .chain(self.spouse)
    }

    /// 以 `id` 作为本人标识，展开为待写入的关系边（父母、子女、配偶顺序）
    pub fn relationships(&self, id: PersonId) -> Vec<Relationship> {
        self.parents
            .iter()
            .map(|parent| Relationship::parent_of(*parent, id))
            .chain(self.children.iter().map(|child| Relationship::parent_of(id, *child)))
            .chain(self.spouse.map(|spouse| Relationship::spouse(id, spouse)))
            .collect()
    }

    /// 替换关系引用（字段已校验，引用在名称解析之后才确定时使用）
    pub fn with_relatives(
        mut self,
        parents: Vec<PersonId>,
        children: Vec<PersonId>,
        spouse: Option<PersonId>,
    ) -> Self {
        self.parents = parents;
        self.children = children;
        self.spouse = spouse;
        self
    }

    pub fn into_profile(self) -> PersonProfile {
        self.profile
    }
}

/// 已登记的人员记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,
    #[serde(flatten)]
    profile: PersonProfile,
    #[serde(flatten)]
    kinship: Kinship,
}

impl Person {
    pub fn new(id: PersonId, profile: PersonProfile, kinship: Kinship) -> Self {
        Self {
            id,
            profile,
            kinship,
        }
    }

    pub fn profile(&self) -> &PersonProfile {
        &self.profile
    }

    pub fn kinship(&self) -> &Kinship {
        &self.kinship
    }

    pub fn first_name(&self) -> &str {
        &self.profile.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.profile.last_name
    }

    pub fn postnomial(&self) -> Postnomial {
        self.profile.postnomial
    }

    pub fn birthdate(&self) -> NaiveDate {
        self.profile.birthdate
    }

    pub fn key(&self) -> PersonKey {
        self.profile.key()
    }

    pub fn name(&self) -> PersonName {
        self.profile.name()
    }

    pub fn children(&self) -> &[PersonId] {
        &self.kinship.children
    }

    pub fn parents(&self) -> &[PersonId] {
        &self.kinship.parents
    }

    pub fn spouse(&self) -> Option<PersonId> {
        self.kinship.spouse
    }
}

impl Entity for Person {
    type Id = PersonId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builder_applies_defaults() {
        let p = NewPerson::builder()
            .first_name("Elizabeth")
            .last_name("Bassett")
            .birthdate(date(1730, 1, 1))
            .gender(Gender::Female)
            .build()
            .unwrap();

        assert_eq!(p.profile().postnomial, Postnomial::None);
        assert!(p.profile().email.is_none());
        assert!(p.profile().occupation.is_empty());
        assert!(p.profile().bio.is_empty());
        assert_eq!(p.references().count(), 0);
    }

    #[test]
    fn invalid_email_fails_construction() {
        let err = NewPerson::builder()
            .first_name("Oliver")
            .last_name("Harrison")
            .birthdate(date(1816, 1, 1))
            .email("not-an-email")
            .gender(Gender::Male)
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { .. }));
    }

    #[test]
    fn blank_names_fail_construction() {
        let err = NewPerson::builder()
            .first_name("  ")
            .last_name("Harrison")
            .birthdate(date(1816, 1, 1))
            .gender(Gender::Male)
            .build()
            .unwrap_err();
        match err {
            DomainError::InvalidValue { reason } => assert!(reason.contains("first name")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn death_before_birth_fails_construction() {
        let err = NewPerson::builder()
            .first_name("Mary Ann")
            .last_name("Harrison")
            .birthdate(date(1838, 1, 1))
            .death_date(date(1837, 12, 31))
            .gender(Gender::Female)
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { .. }));
    }

    #[test]
    fn references_cover_all_relationships() {
        let (a, b, c) = (PersonId::generate(), PersonId::generate(), PersonId::generate());
        let p = NewPerson::builder()
            .first_name("Oliver")
            .last_name("Harrison")
            .birthdate(date(1816, 1, 1))
            .gender(Gender::Male)
            .parents(vec![a, b])
            .spouse(c)
            .build()
            .unwrap();
        let refs: Vec<_> = p.references().collect();
        assert_eq!(refs, vec![a, b, c]);

        let me = PersonId::generate();
        assert_eq!(
            p.relationships(me),
            vec![
                Relationship::parent_of(a, me),
                Relationship::parent_of(b, me),
                Relationship::spouse(me, c),
            ]
        );
    }

    #[test]
    fn matches_name_with_optional_postnomial() {
        let p = NewPerson::builder()
            .first_name("Benjamin")
            .last_name("Harrison")
            .postnomial(Postnomial::V)
            .birthdate(date(1726, 4, 5))
            .gender(Gender::Male)
            .build()
            .unwrap();
        let profile = p.profile();
        assert!(profile.matches_name("Benjamin", "Harrison", None));
        assert!(profile.matches_name("Benjamin", "Harrison", Some(Postnomial::V)));
        assert!(!profile.matches_name("Benjamin", "Harrison", Some(Postnomial::IV)));
        assert!(!profile.matches_name("William Henry", "Harrison", None));
    }
}
