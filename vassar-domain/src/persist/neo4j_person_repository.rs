//! 基于 Neo4j 的图存储实现（feature = "infra-neo4j"）
//!
//! 节点标签 `Person`，关系类型 `PARENT_OF`（父/母 → 子女）与 `SPOUSE`。
//! 唯一性由复合唯一约束 `(firstName, lastName, birthdate)` 兜底，
//! 写入语句本身也以条件 `CREATE` 的方式拒绝重复键。
//! 配偶唯一与父母上限在写入语句内加锁复核，需要 Neo4j 5 的 `EXISTS {}`/`COUNT {}` 子查询。
//!
use crate::entity::PersonId;
use crate::error::{DomainError, DomainResult};
use crate::persist::PersonRepository;
use crate::person::{NewPerson, Person, PersonProfile};
use crate::relationship::{Kinship, MAX_PARENTS, Relationship};
use crate::value_object::{Email, PersonKey, Postnomial};
use async_trait::async_trait;
use chrono::NaiveDate;
use neo4rs::{Graph, Query, Row, query};
use tracing::{debug, info};

const SCHEMA: [&str; 2] = [
    "CREATE CONSTRAINT person_identity IF NOT EXISTS \
     FOR (p:Person) REQUIRE (p.firstName, p.lastName, p.birthdate) IS UNIQUE",
    "CREATE CONSTRAINT person_id IF NOT EXISTS FOR (p:Person) REQUIRE p.id IS UNIQUE",
];

// 追加在 `MATCH (p:Person) ...` 之后，投影出节点属性与有序的亲属标识
const PROJECTION: &str = "
    OPTIONAL MATCH (p)-[c:PARENT_OF]->(child:Person)
    WITH p, child, c ORDER BY c.created, c.ordinal
    WITH p, [x IN collect(child.id) WHERE x IS NOT NULL] AS children
    OPTIONAL MATCH (parent:Person)-[r:PARENT_OF]->(p)
    WITH p, children, parent, r ORDER BY r.created, r.ordinal
    WITH p, children, [x IN collect(parent.id) WHERE x IS NOT NULL] AS parents
    OPTIONAL MATCH (p)-[:SPOUSE]-(s:Person)
    WITH p, children, parents, collect(s.id) AS spouses
    RETURN p.id AS id, p.firstName AS firstName, p.lastName AS lastName,
           p.postnomial AS postnomial, toString(p.birthdate) AS birthdate,
           toString(p.deathOfDate) AS deathOfDate, p.email AS email, p.gender AS gender,
           p.occupation AS occupation, p.bio AS bio,
           children, parents, head(spouses) AS spouse
    ORDER BY p.created, p.id";

// 先对涉及的亲属节点加写锁，再在同一事务内复核配偶与父母数量，
// 条件不满足时不产生任何写入（返回零行）
const CREATE: &str = "
    OPTIONAL MATCH (existing:Person {firstName: $firstName, lastName: $lastName})
      WHERE existing.birthdate = date($birthdate)
    WITH existing WHERE existing IS NULL
    OPTIONAL MATCH (x:Person) WHERE x.id IN $relatives
    WITH existing, collect(x) AS relatives
    FOREACH (x IN relatives | SET x._lock = true REMOVE x._lock)
    WITH relatives
    WHERE size(relatives) = size($relatives)
      AND ALL(x IN relatives WHERE NOT (x.id IN $spouse AND EXISTS { (x)-[:SPOUSE]-() }))
      AND ALL(x IN relatives WHERE NOT (x.id IN $children
              AND COUNT { (:Person)-[:PARENT_OF]->(x) } >= $maxParents))
    CREATE (p:Person {
        id: $id, firstName: $firstName, lastName: $lastName, postnomial: $postnomial,
        birthdate: date($birthdate), email: $email, gender: $gender,
        occupation: $occupation, bio: $bio, created: timestamp()
    })
    FOREACH (d IN CASE WHEN $deathOfDate IS NULL THEN [] ELSE [$deathOfDate] END |
        SET p.deathOfDate = date(d))
    WITH p
    CALL {
        WITH p
        UNWIND range(0, size($parents) - 1) AS i
        MATCH (x:Person {id: $parents[i]})
        CREATE (x)-[:PARENT_OF {created: timestamp(), ordinal: i}]->(p)
    }
    CALL {
        WITH p
        UNWIND range(0, size($children) - 1) AS i
        MATCH (x:Person {id: $children[i]})
        CREATE (p)-[:PARENT_OF {created: timestamp(), ordinal: i}]->(x)
    }
    CALL {
        WITH p
        UNWIND $spouse AS sid
        MATCH (x:Person {id: sid})
        CREATE (p)-[:SPOUSE {created: timestamp()}]->(x)
    }
    RETURN p.id AS id";

const RELATE_PARENT: &str = "
    MATCH (a:Person {id: $from}), (b:Person {id: $to})
    SET b._lock = true REMOVE b._lock
    WITH a, b
    WHERE EXISTS { (a)-[:PARENT_OF]->(b) }
       OR COUNT { (:Person)-[:PARENT_OF]->(b) } < $maxParents
    MERGE (a)-[r:PARENT_OF]->(b)
      ON CREATE SET r.created = timestamp(), r.ordinal = 0
    RETURN r.created AS created";

const RELATE_SPOUSE: &str = "
    MATCH (a:Person {id: $from}), (b:Person {id: $to})
    SET a._lock = true, b._lock = true REMOVE a._lock, b._lock
    WITH a, b
    WHERE NOT EXISTS { (a)-[:SPOUSE]-(o:Person) WHERE o <> b }
      AND NOT EXISTS { (b)-[:SPOUSE]-(o:Person) WHERE o <> a }
    MERGE (a)-[r:SPOUSE]-(b)
      ON CREATE SET r.created = timestamp()
    RETURN r.created AS created";

/// 新节点需要建立的边，按方向拆分为端点标识
#[derive(Debug, Default, PartialEq, Eq)]
struct Endpoints {
    parents: Vec<String>,
    children: Vec<String>,
    spouse: Vec<String>,
    /// 去重后的全部亲属，写入时统一加锁
    relatives: Vec<String>,
}

impl Endpoints {
    fn split(id: PersonId, accepted: &[Relationship]) -> Self {
        let mut out = Endpoints::default();
        for rel in accepted {
            let other = match *rel {
                Relationship::ParentOf { parent, child } if child == id => {
                    out.parents.push(parent.to_string());
                    parent
                }
                Relationship::ParentOf { child, .. } => {
                    out.children.push(child.to_string());
                    child
                }
                Relationship::Spouse { a, b } => {
                    let other = if a == id { b } else { a };
                    out.spouse.push(other.to_string());
                    other
                }
            };
            let other = other.to_string();
            if !out.relatives.contains(&other) {
                out.relatives.push(other);
            }
        }
        out
    }
}

/// Neo4j 图存储
pub struct Neo4jPersonRepository {
    graph: Graph,
}

impl Neo4jPersonRepository {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// 连接 Neo4j
    pub fn connect(uri: &str, user: &str, password: &str) -> DomainResult<Self> {
        let graph = Graph::new(uri, user, password)?;
        Ok(Self::new(graph))
    }

    /// 创建唯一约束（幂等）
    pub async fn ensure_schema(&self) -> DomainResult<()> {
        for statement in SCHEMA {
            self.graph.run(query(statement)).await?;
        }
        info!("neo4j person constraints ensured");
        Ok(())
    }

    async fn fetch(&self, q: Query) -> DomainResult<Vec<Person>> {
        let mut stream = self.graph.execute(q).await?;
        let mut people = Vec::new();
        while let Some(row) = stream.next().await? {
            people.push(row_to_person(&row)?);
        }
        Ok(people)
    }

    async fn fetch_one(&self, q: Query) -> DomainResult<Option<Person>> {
        Ok(self.fetch(q).await?.into_iter().next())
    }

    async fn kinship(&self, id: PersonId) -> DomainResult<Kinship> {
        self.get(id)
            .await?
            .map(|p| p.kinship().clone())
            .ok_or_else(|| DomainError::ReferenceNotFound { id: id.to_string() })
    }

    /// 在写入前对候选边做与内存实现一致的校验，返回需要写入的边
    async fn accept(&self, id: PersonId, candidates: Vec<Relationship>) -> DomainResult<Vec<Relationship>> {
        let mut accepted: Vec<Relationship> = Vec::with_capacity(candidates.len());
        for rel in candidates {
            rel.validate()?;
            let (from, to) = rel.endpoints();
            let mut from_kin = self.kinship_or_empty(from, id).await?;
            let mut to_kin = self.kinship_or_empty(to, id).await?;
            for pending in &accepted {
                from_kin.absorb(from, pending);
                to_kin.absorb(to, pending);
            }
            if rel.check(&from_kin, &to_kin)? {
                accepted.push(rel);
            }
        }
        Ok(accepted)
    }

    /// 写入语句拒绝后重新校验，给出具体原因
    async fn rejection(&self, id: PersonId, candidates: Vec<Relationship>) -> DomainError {
        match self.accept(id, candidates).await {
            Err(err) => err,
            Ok(_) => DomainError::InvalidState {
                reason: "relatives changed concurrently, retry".to_string(),
            },
        }
    }

    async fn kinship_or_empty(&self, id: PersonId, new_id: PersonId) -> DomainResult<Kinship> {
        if id == new_id {
            Ok(Kinship::default())
        } else {
            self.kinship(id).await
        }
    }
}

#[async_trait]
impl PersonRepository for Neo4jPersonRepository {
    async fn insert(&self, person: NewPerson) -> DomainResult<Person> {
        let key = person.key();
        let id = PersonId::generate();
        let candidates = person.relationships(id);
        // 已存在的等价边会被跳过，只传递需要新建的端点
        let accepted = self.accept(id, candidates.clone()).await?;
        let endpoints = Endpoints::split(id, &accepted);

        let profile = person.into_profile();
        let q = query(CREATE)
            .param("id", id.to_string())
            .param("firstName", profile.first_name.clone())
            .param("lastName", profile.last_name.clone())
            .param("postnomial", profile.postnomial.as_str())
            .param("birthdate", profile.birthdate.to_string())
            .param("deathOfDate", profile.death_date.map(|d| d.to_string()))
            .param("email", profile.email.as_ref().map(|e| e.as_str().to_string()))
            .param("gender", profile.gender.as_str())
            .param("occupation", profile.occupation.clone())
            .param("bio", profile.bio.clone())
            .param("parents", endpoints.parents)
            .param("children", endpoints.children)
            .param("spouse", endpoints.spouse)
            .param("relatives", endpoints.relatives)
            .param("maxParents", MAX_PARENTS as i64);

        let created = match self.graph.execute(q).await {
            Ok(mut stream) => stream.next().await?.is_some(),
            Err(err) if is_constraint_violation(&err) => {
                return Err(DomainError::DuplicateRecord {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        if !created {
            // 零行：重复键，或亲属在预检之后被并发修改
            if self.find_by_key(&key).await?.is_some() {
                return Err(DomainError::DuplicateRecord {
                    key: key.to_string(),
                });
            }
            return Err(self.rejection(id, candidates).await);
        }
        debug!(person_id = %id, "person node created in neo4j");

        self.get(id).await?.ok_or_else(|| DomainError::Repository {
            reason: format!("stored person {id} vanished"),
        })
    }

    async fn get(&self, id: PersonId) -> DomainResult<Option<Person>> {
        let q = query(&format!("MATCH (p:Person {{id: $id}}) {PROJECTION}"))
            .param("id", id.to_string());
        self.fetch_one(q).await
    }

    async fn find_by_key(&self, key: &PersonKey) -> DomainResult<Option<Person>> {
        let q = query(&format!(
            "MATCH (p:Person {{firstName: $firstName, lastName: $lastName}}) \
             WHERE p.birthdate = date($birthdate) {PROJECTION}"
        ))
        .param("firstName", key.first_name.clone())
        .param("lastName", key.last_name.clone())
        .param("birthdate", key.birthdate.to_string());
        self.fetch_one(q).await
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        postnomial: Option<Postnomial>,
    ) -> DomainResult<Vec<Person>> {
        let q = match postnomial {
            Some(p) => query(&format!(
                "MATCH (p:Person {{firstName: $firstName, lastName: $lastName, postnomial: $postnomial}}) {PROJECTION}"
            ))
            .param("postnomial", p.as_str()),
            None => query(&format!(
                "MATCH (p:Person {{firstName: $firstName, lastName: $lastName}}) {PROJECTION}"
            )),
        };
        self.fetch(
            q.param("firstName", first_name.to_string())
                .param("lastName", last_name.to_string()),
        )
        .await
    }

    async fn relate(&self, relationship: Relationship) -> DomainResult<()> {
        relationship.validate()?;
        let (from, to) = relationship.endpoints();
        let from_kin = self.kinship(from).await?;
        let to_kin = self.kinship(to).await?;
        if !relationship.check(&from_kin, &to_kin)? {
            debug!(%from, %to, kind = %relationship.kind(), "relationship already present");
            return Ok(());
        }

        let statement = match relationship {
            Relationship::ParentOf { .. } => RELATE_PARENT,
            Relationship::Spouse { .. } => RELATE_SPOUSE,
        };
        let mut stream = self
            .graph
            .execute(
                query(statement)
                    .param("from", from.to_string())
                    .param("to", to.to_string())
                    .param("maxParents", MAX_PARENTS as i64),
            )
            .await?;
        if stream.next().await?.is_none() {
            return Err(self.rejection(from, vec![relationship]).await);
        }
        Ok(())
    }

    async fn all(&self) -> DomainResult<Vec<Person>> {
        self.fetch(query(&format!("MATCH (p:Person) {PROJECTION}")))
            .await
    }

    async fn edges(&self) -> DomainResult<Vec<Relationship>> {
        let mut edges = Vec::new();
        for (kind, statement) in [
            (
                "PARENT_OF",
                "MATCH (a:Person)-[r:PARENT_OF]->(b:Person) \
                 RETURN a.id AS source, b.id AS target ORDER BY r.created, r.ordinal",
            ),
            (
                "SPOUSE",
                "MATCH (a:Person)-[r:SPOUSE]->(b:Person) \
                 RETURN a.id AS source, b.id AS target ORDER BY r.created",
            ),
        ] {
            let mut stream = self.graph.execute(query(statement)).await?;
            while let Some(row) = stream.next().await? {
                let source: PersonId = row.get::<String>("source")?.parse()?;
                let target: PersonId = row.get::<String>("target")?.parse()?;
                edges.push(match kind {
                    "PARENT_OF" => Relationship::parent_of(source, target),
                    _ => Relationship::spouse(source, target),
                });
            }
        }
        Ok(edges)
    }

    async fn count(&self) -> DomainResult<usize> {
        let mut stream = self
            .graph
            .execute(query("MATCH (p:Person) RETURN count(p) AS n"))
            .await?;
        let n = match stream.next().await? {
            Some(row) => row.get::<i64>("n")?,
            None => 0,
        };
        Ok(usize::try_from(n).unwrap_or_default())
    }

    async fn delete_all(&self) -> DomainResult<()> {
        self.graph.run(query("MATCH (p:Person) DETACH DELETE p")).await?;
        info!("neo4j person graph cleared");
        Ok(())
    }
}

fn is_constraint_violation(err: &neo4rs::Error) -> bool {
    err.to_string().contains("ConstraintValidationFailed")
}

fn parse_ids(raw: Vec<String>) -> DomainResult<Vec<PersonId>> {
    raw.iter().map(|s| s.parse()).collect()
}

fn row_to_person(row: &Row) -> DomainResult<Person> {
    let id: PersonId = row.get::<String>("id")?.parse()?;
    let death_date = row
        .get::<Option<String>>("deathOfDate")?
        .map(|d| d.parse::<NaiveDate>())
        .transpose()?;
    let email = row
        .get::<Option<String>>("email")?
        .map(Email::new)
        .transpose()?;
    let profile = PersonProfile {
        first_name: row.get("firstName")?,
        last_name: row.get("lastName")?,
        postnomial: row.get::<String>("postnomial")?.parse()?,
        birthdate: row.get::<String>("birthdate")?.parse()?,
        death_date,
        email,
        gender: row.get::<String>("gender")?.parse()?,
        occupation: row.get::<Option<Vec<String>>>("occupation")?.unwrap_or_default(),
        bio: row.get::<Option<String>>("bio")?.unwrap_or_default(),
    };
    let kinship = Kinship {
        children: parse_ids(row.get("children")?)?,
        parents: parse_ids(row.get("parents")?)?,
        spouse: row
            .get::<Option<String>>("spouse")?
            .map(|s| s.parse())
            .transpose()?,
    };
    Ok(Person::new(id, profile, kinship))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_split_by_direction_and_dedup_relatives() {
        let id = PersonId::generate();
        let father = PersonId::generate();
        let child = PersonId::generate();
        let wife = PersonId::generate();
        let accepted = [
            Relationship::parent_of(father, id),
            Relationship::parent_of(id, child),
            Relationship::spouse(wife, id),
            Relationship::parent_of(id, wife),
        ];

        let endpoints = Endpoints::split(id, &accepted);
        assert_eq!(endpoints.parents, vec![father.to_string()]);
        assert_eq!(endpoints.children, vec![child.to_string(), wife.to_string()]);
        assert_eq!(endpoints.spouse, vec![wife.to_string()]);
        assert_eq!(
            endpoints.relatives,
            vec![father.to_string(), child.to_string(), wife.to_string()]
        );
    }

    #[test]
    fn write_statements_guard_spouse_and_parent_limits() {
        for statement in [CREATE, RELATE_SPOUSE] {
            assert!(statement.contains("[:SPOUSE]-("));
            assert!(statement.contains("_lock"));
        }
        for statement in [CREATE, RELATE_PARENT] {
            assert!(statement.contains("COUNT { (:Person)-[:PARENT_OF]->"));
            assert!(statement.contains("$maxParents"));
        }
    }
}
