use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vassar_domain::entity::{Entity, PersonId};
use vassar_domain::error::{DomainError, DomainResult};
use vassar_domain::persist::PersonRepository;
use vassar_domain::person::NewPerson;
use vassar_domain::registry::PersonRegistry;
use vassar_domain::value_object::{Gender, PersonKey, PersonName, Postnomial};

/// 对另一位人员的引用：标识，或按姓名（可带后缀）查找
///
/// 嵌套的完整人员对象也按此形式解析，多余字段被忽略。
/// 带出生日期时按 (名, 姓, 出生日期) 精确定位，同名者不会产生歧义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonRef {
    Id(PersonId),
    #[serde(rename_all = "camelCase")]
    Name {
        first_name: String,
        last_name: String,
        #[serde(default)]
        postnomial: Option<Postnomial>,
        #[serde(default)]
        birthdate: Option<NaiveDate>,
    },
}

impl PersonRef {
    pub fn by_name(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postnomial: Option<Postnomial>,
    ) -> Self {
        PersonRef::Name {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postnomial,
            birthdate: None,
        }
    }

    pub fn by_key(key: PersonKey) -> Self {
        PersonRef::Name {
            first_name: key.first_name,
            last_name: key.last_name,
            postnomial: None,
            birthdate: Some(key.birthdate),
        }
    }

    /// 解析为已登记人员的标识；按姓名找不到时返回 `ReferenceNotFound`
    ///
    /// 标识形式的引用原样返回，其存在性由存储在写入时校验。
    pub async fn resolve<R: PersonRepository>(
        &self,
        registry: &PersonRegistry<R>,
    ) -> DomainResult<PersonId> {
        match self {
            PersonRef::Id(id) => Ok(*id),
            PersonRef::Name {
                first_name,
                last_name,
                birthdate: Some(birthdate),
                ..
            } => {
                let key = PersonKey::new(first_name.as_str(), last_name.as_str(), *birthdate);
                match registry.find_by_key(&key).await? {
                    Some(person) => Ok(*person.id()),
                    None => Err(DomainError::ReferenceNotFound {
                        id: key.to_string(),
                    }),
                }
            }
            PersonRef::Name {
                first_name,
                last_name,
                postnomial,
                birthdate: None,
            } => registry
                .find_by_name(first_name, last_name, *postnomial)
                .await?
                .map(|p| *p.id())
                .ok_or_else(|| DomainError::ReferenceNotFound {
                    id: PersonName::new(first_name, last_name, *postnomial).to_string(),
                }),
        }
    }
}

impl From<PersonId> for PersonRef {
    fn from(id: PersonId) -> Self {
        PersonRef::Id(id)
    }
}

/// 登记请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub postnomial: Option<Postnomial>,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub death_of_date: Option<NaiveDate>,
    #[serde(default)]
    pub occupation: Vec<String>,
    #[serde(default)]
    pub bio: String,
    pub gender: Gender,
    #[serde(default)]
    pub children: Vec<PersonRef>,
    #[serde(default)]
    pub parents: Vec<PersonRef>,
    #[serde(default)]
    pub spouse: Option<PersonRef>,
}

impl PersonInput {
    /// 先做字段校验，再解析关系引用
    pub async fn resolve<R: PersonRepository>(
        self,
        registry: &PersonRegistry<R>,
    ) -> DomainResult<NewPerson> {
        let person = NewPerson::builder()
            .first_name(self.first_name)
            .last_name(self.last_name)
            .maybe_postnomial(self.postnomial)
            .birthdate(self.birthdate)
            .maybe_death_date(self.death_of_date)
            .maybe_email(self.email)
            .gender(self.gender)
            .occupation(self.occupation)
            .bio(self.bio)
            .build()?;

        let mut parents = Vec::with_capacity(self.parents.len());
        for r in &self.parents {
            parents.push(r.resolve(registry).await?);
        }
        let mut children = Vec::with_capacity(self.children.len());
        for r in &self.children {
            children.push(r.resolve(registry).await?);
        }
        let spouse = match &self.spouse {
            Some(r) => Some(r.resolve(registry).await?),
            None => None,
        };

        Ok(person.with_relatives(parents, children, spouse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_ref_accepts_id_or_name() {
        let id = PersonId::generate();
        let by_id: PersonRef = serde_json::from_value(serde_json::json!(id.to_string())).unwrap();
        assert_eq!(by_id, PersonRef::Id(id));

        let by_name: PersonRef = serde_json::from_value(serde_json::json!({
            "firstName": "Benjamin",
            "lastName": "Harrison",
            "postnomial": "V",
            "birthdate": "1726-04-05"
        }))
        .unwrap();
        assert_eq!(
            by_name,
            PersonRef::Name {
                first_name: "Benjamin".into(),
                last_name: "Harrison".into(),
                postnomial: Some(Postnomial::V),
                birthdate: NaiveDate::from_ymd_opt(1726, 4, 5),
            }
        );

        let without_date: PersonRef = serde_json::from_value(serde_json::json!({
            "firstName": "Elizabeth",
            "lastName": "Bassett"
        }))
        .unwrap();
        assert_eq!(without_date, PersonRef::by_name("Elizabeth", "Bassett", None));
    }

    #[test]
    fn input_defaults_optional_fields() {
        let input: PersonInput = serde_json::from_value(serde_json::json!({
            "firstName": "Dilsia",
            "lastName": "Unknown",
            "birthdate": "1800-01-01",
            "gender": "FEMALE"
        }))
        .unwrap();
        assert!(input.email.is_none());
        assert!(input.postnomial.is_none());
        assert!(input.death_of_date.is_none());
        assert!(input.parents.is_empty() && input.children.is_empty());
        assert!(input.spouse.is_none());
    }
}
