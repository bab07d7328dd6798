use crate::dto::Dto;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vassar_domain::entity::{Entity, PersonId};
use vassar_domain::error::{DomainError, DomainResult};
use vassar_domain::persist::PersonRepository;
use vassar_domain::person::Person;
use vassar_domain::registry::{GraphSnapshot, PersonRegistry};
use vassar_domain::relationship::RelationshipKind;
use vassar_domain::value_object::{Gender, Postnomial};

/// 关系中出现的人员摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRefDto {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub postnomial: Postnomial,
}

impl From<&Person> for PersonRefDto {
    fn from(p: &Person) -> Self {
        Self {
            id: *p.id(),
            first_name: p.first_name().to_string(),
            last_name: p.last_name().to_string(),
            postnomial: p.postnomial(),
        }
    }
}

/// 人员详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub postnomial: Postnomial,
    pub birthdate: NaiveDate,
    pub death_of_date: Option<NaiveDate>,
    pub occupation: Vec<String>,
    pub bio: String,
    pub gender: Gender,
    pub children: Vec<PersonRefDto>,
    pub parents: Vec<PersonRefDto>,
    pub spouse: Option<PersonRefDto>,
}

impl Dto for PersonDto {}

impl PersonDto {
    /// 组装详情，关系端点解析为人员摘要
    pub async fn assemble<R: PersonRepository>(
        registry: &PersonRegistry<R>,
        person: &Person,
    ) -> DomainResult<Self> {
        let mut children = Vec::with_capacity(person.children().len());
        for id in person.children() {
            children.push(relative(registry, *id).await?);
        }
        let mut parents = Vec::with_capacity(person.parents().len());
        for id in person.parents() {
            parents.push(relative(registry, *id).await?);
        }
        let spouse = match person.spouse() {
            Some(id) => Some(relative(registry, id).await?),
            None => None,
        };

        let profile = person.profile();
        Ok(Self {
            id: *person.id(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.as_ref().map(|e| e.as_str().to_string()),
            postnomial: profile.postnomial,
            birthdate: profile.birthdate,
            death_of_date: profile.death_date,
            occupation: profile.occupation.clone(),
            bio: profile.bio.clone(),
            gender: profile.gender,
            children,
            parents,
            spouse,
        })
    }
}

async fn relative<R: PersonRepository>(
    registry: &PersonRegistry<R>,
    id: PersonId,
) -> DomainResult<PersonRefDto> {
    registry
        .get(id)
        .await?
        .map(|p| PersonRefDto::from(&p))
        .ok_or_else(|| DomainError::ReferenceNotFound { id: id.to_string() })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNodeDto {
    pub id: PersonId,
    pub name: String,
    /// 1 = 男性，2 = 女性
    pub group: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLinkDto {
    pub source: PersonId,
    pub target: PersonId,
    pub kind: RelationshipKind,
}

/// 力导向图所需的扁平节点/连线数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDto {
    pub nodes: Vec<GraphNodeDto>,
    pub links: Vec<GraphLinkDto>,
}

impl Dto for GraphDto {}

impl From<GraphSnapshot> for GraphDto {
    fn from(snapshot: GraphSnapshot) -> Self {
        let nodes = snapshot
            .people
            .iter()
            .map(|p| GraphNodeDto {
                id: *p.id(),
                name: p.name().to_string(),
                group: match p.profile().gender {
                    Gender::Male => 1,
                    Gender::Female => 2,
                },
            })
            .collect();
        let links = snapshot
            .edges
            .iter()
            .map(|edge| {
                let (source, target) = edge.endpoints();
                GraphLinkDto {
                    source,
                    target,
                    kind: edge.kind(),
                }
            })
            .collect();
        Self { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vassar_domain::person::PersonProfile;
    use vassar_domain::relationship::{Kinship, Relationship};

    fn person(first: &str, postnomial: Postnomial, gender: Gender) -> Person {
        Person::new(
            PersonId::generate(),
            PersonProfile {
                first_name: first.to_string(),
                last_name: "Harrison".to_string(),
                postnomial,
                birthdate: NaiveDate::from_ymd_opt(1726, 4, 5).unwrap(),
                death_date: None,
                email: None,
                gender,
                occupation: vec![],
                bio: String::new(),
            },
            Kinship::default(),
        )
    }

    #[test]
    fn graph_dto_flattens_snapshot() {
        let father = person("Benjamin", Postnomial::V, Gender::Male);
        let daughter = person("Mary Ann", Postnomial::None, Gender::Female);
        let dto = GraphDto::from(GraphSnapshot {
            edges: vec![Relationship::parent_of(*father.id(), *daughter.id())],
            people: vec![father.clone(), daughter.clone()],
        });

        assert_eq!(dto.nodes[0].name, "Benjamin Harrison V");
        assert_eq!(dto.nodes[0].group, 1);
        assert_eq!(dto.nodes[1].name, "Mary Ann Harrison");
        assert_eq!(dto.nodes[1].group, 2);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["links"][0]["kind"], "PARENT_OF");
        assert_eq!(json["links"][0]["source"], father.id().to_string());
        assert_eq!(json["links"][0]["target"], daughter.id().to_string());
    }
}
