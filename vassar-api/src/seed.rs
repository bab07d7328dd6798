//! Harrison 家族样例数据
//!
//! 清空后分两阶段载入：先登记全部人员，再按存储分配的标识补充关系边。

use chrono::NaiveDate;
use tracing::info;
use vassar_application::command_bus::CommandBus;
use vassar_application::context::AppContext;
use vassar_application::error::AppError;
use vassar_application::person::{DeleteAllPeople, LoadPerson, PersonInput, RelatePeople};
use vassar_domain::entity::PersonId;
use vassar_domain::error::DomainError;
use vassar_domain::relationship::RelationshipKind;
use vassar_domain::value_object::{Gender, Postnomial};

use crate::state::AppState;

struct Fixture {
    first_name: &'static str,
    last_name: &'static str,
    postnomial: Postnomial,
    born: &'static str,
    died: &'static str,
    email: &'static str,
    gender: Gender,
    occupation: &'static [&'static str],
    bio: &'static str,
}

const BENJAMIN_IV: usize = 0;
const BENJAMIN_V: usize = 1;
const ELIZABETH: usize = 2;
const WILLIAM_HENRY: usize = 3;
const DILSIA: usize = 4;
const OLIVER: usize = 5;
const MARGARET: usize = 6;
const MARY_ANN: usize = 7;

const PEOPLE: [Fixture; 8] = [
    Fixture {
        first_name: "Benjamin",
        last_name: "Harrison",
        postnomial: Postnomial::IV,
        born: "1693-09-11",
        died: "1745-07-12",
        email: "benjamin.harrison.iv@email.com",
        gender: Gender::Male,
        occupation: &[
            "Lawyer",
            "Burgess and High Sheriff",
            "Member of Virginia House of Burgesses",
        ],
        bio: "Benjamin Harrison IV was an American Virginia planter, politician, and member of the Virginia House of Burgesses.",
    },
    Fixture {
        first_name: "Benjamin",
        last_name: "Harrison",
        postnomial: Postnomial::V,
        born: "1726-04-05",
        died: "1791-04-24",
        email: "benjamin.harrison.v@email.com",
        gender: Gender::Male,
        occupation: &[
            "Member of the Virginia House of Burgesses",
            "Signer of the Declaration of Independence",
        ],
        bio: "Benjamin Harrison V was an American planter and merchant, a revolutionary leader, and a Founding Father of the United States.",
    },
    Fixture {
        first_name: "Elizabeth",
        last_name: "Bassett",
        postnomial: Postnomial::None,
        born: "1730-01-01",
        died: "1792-02-13",
        email: "elizabeth.bassett@email.com",
        gender: Gender::Female,
        occupation: &[],
        bio: "Elizabeth Bassett Harrison was the wife of Benjamin Harrison V and the mother of William Henry Harrison, the ninth President of the United States.",
    },
    Fixture {
        first_name: "William Henry",
        last_name: "Harrison",
        postnomial: Postnomial::None,
        born: "1773-02-09",
        died: "1841-04-04",
        email: "william.henry.harrison@email.com",
        gender: Gender::Male,
        occupation: &["9th President of the United States"],
        bio: "William Henry Harrison was an American military officer and politician who served as the ninth president of the United States.",
    },
    Fixture {
        first_name: "Dilsia",
        last_name: "Unknown",
        postnomial: Postnomial::None,
        born: "1800-01-01",
        died: "1850-01-01",
        email: "dilsia@email.com",
        gender: Gender::Female,
        occupation: &["Slave"],
        bio: "Dilsia was a slave who had a son, Oliver, with William Henry Harrison.",
    },
    Fixture {
        first_name: "Oliver",
        last_name: "Harrison",
        postnomial: Postnomial::None,
        born: "1816-01-01",
        died: "1900-01-01",
        email: "oliver.harrison@email.com",
        gender: Gender::Male,
        occupation: &[],
        bio: "Oliver Harrison was the son of Dilsia and William Henry Harrison.",
    },
    Fixture {
        first_name: "Margaret",
        last_name: "Wills",
        postnomial: Postnomial::None,
        born: "1818-01-01",
        died: "1890-01-01",
        email: "margaret.wills@email.com",
        gender: Gender::Female,
        occupation: &[],
        bio: "Margaret Wills was the spouse of Oliver Harrison and the mother of Mary Ann Harrison.",
    },
    Fixture {
        first_name: "Mary Ann",
        last_name: "Harrison",
        postnomial: Postnomial::None,
        born: "1838-01-01",
        died: "1910-01-01",
        email: "mary.ann.harrison@email.com",
        gender: Gender::Female,
        occupation: &[],
        bio: "Mary Ann Harrison was the daughter of Oliver Harrison and Margaret Wills.",
    },
];

const EDGES: [(RelationshipKind, usize, usize); 7] = [
    (RelationshipKind::ParentOf, BENJAMIN_IV, BENJAMIN_V),
    (RelationshipKind::ParentOf, BENJAMIN_V, WILLIAM_HENRY),
    (RelationshipKind::Spouse, BENJAMIN_V, ELIZABETH),
    (RelationshipKind::ParentOf, WILLIAM_HENRY, OLIVER),
    (RelationshipKind::ParentOf, DILSIA, OLIVER),
    (RelationshipKind::ParentOf, OLIVER, MARY_ANN),
    (RelationshipKind::ParentOf, MARGARET, MARY_ANN),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub people: usize,
    pub relationships: usize,
}

fn date(s: &str) -> Result<NaiveDate, DomainError> {
    Ok(s.parse::<NaiveDate>()?)
}

impl Fixture {
    fn input(&self) -> Result<PersonInput, DomainError> {
        Ok(PersonInput {
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
            email: Some(self.email.to_string()),
            postnomial: Some(self.postnomial),
            birthdate: date(self.born)?,
            death_of_date: Some(date(self.died)?),
            occupation: self.occupation.iter().map(|s| s.to_string()).collect(),
            bio: self.bio.to_string(),
            gender: self.gender,
            children: Vec::new(),
            parents: Vec::new(),
            spouse: None,
        })
    }
}

/// 清空存储并载入样例数据
pub async fn load_fixture(state: &AppState, ctx: &AppContext) -> Result<SeedSummary, AppError> {
    state.commands.dispatch(ctx, DeleteAllPeople).await?;

    let mut ids: Vec<PersonId> = Vec::with_capacity(PEOPLE.len());
    for fixture in &PEOPLE {
        let stored = state
            .commands
            .dispatch(ctx, LoadPerson { person: fixture.input()? })
            .await?;
        ids.push(stored.id);
    }

    for (kind, from, to) in EDGES {
        state
            .commands
            .dispatch(
                ctx,
                RelatePeople {
                    kind,
                    from: ids[from].into(),
                    to: ids[to].into(),
                },
            )
            .await?;
    }

    let summary = SeedSummary {
        people: ids.len(),
        relationships: EDGES.len(),
    };
    info!(people = summary.people, relationships = summary.relationships, "fixture loaded");
    Ok(summary)
}
