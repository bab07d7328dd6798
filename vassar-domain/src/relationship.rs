//! 关系边（Relationship）
//!
//! 关系以独立的边记录保存，只引用已分配的人员标识：
//! - `ParentOf`：有向边，父/母 → 子女；子女视图与父母视图由同一条边推导，天然互逆；
//! - `Spouse`：只保存一次，读取时双向可见，因此配偶关系天然对称。
//!
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::PersonId;
use crate::error::{DomainError, DomainResult};

/// 一个子女最多记录的父母数量
pub const MAX_PARENTS: usize = 2;

/// 关系类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    ParentOf,
    Spouse,
}

impl RelationshipKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::ParentOf => "PARENT_OF",
            RelationshipKind::Spouse => "SPOUSE",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 关系边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    ParentOf { parent: PersonId, child: PersonId },
    Spouse { a: PersonId, b: PersonId },
}

impl Relationship {
    pub fn parent_of(parent: PersonId, child: PersonId) -> Self {
        Relationship::ParentOf { parent, child }
    }

    pub fn spouse(a: PersonId, b: PersonId) -> Self {
        Relationship::Spouse { a, b }
    }

    /// 由关系类型与起止端点构造
    pub fn from_kind(kind: RelationshipKind, from: PersonId, to: PersonId) -> Self {
        match kind {
            RelationshipKind::ParentOf => Self::parent_of(from, to),
            RelationshipKind::Spouse => Self::spouse(from, to),
        }
    }

    pub fn kind(&self) -> RelationshipKind {
        match self {
            Relationship::ParentOf { .. } => RelationshipKind::ParentOf,
            Relationship::Spouse { .. } => RelationshipKind::Spouse,
        }
    }

    /// 起止端点（对 `Spouse` 而言顺序无语义）
    pub fn endpoints(&self) -> (PersonId, PersonId) {
        match *self {
            Relationship::ParentOf { parent, child } => (parent, child),
            Relationship::Spouse { a, b } => (a, b),
        }
    }

    /// 结构校验：禁止自环
    pub fn validate(&self) -> DomainResult<()> {
        let (from, to) = self.endpoints();
        if from == to {
            return Err(DomainError::InvalidValue {
                reason: format!("{} relationship cannot point to itself: {from}", self.kind()),
            });
        }
        Ok(())
    }

    /// 依据两端当前的亲属视图校验本条边
    ///
    /// 返回 `Ok(false)` 表示等价的边已存在（幂等，无需写入）。
    pub fn check(&self, from: &Kinship, to: &Kinship) -> DomainResult<bool> {
        match *self {
            Relationship::ParentOf { parent, child } => {
                if to.parents.contains(&parent) {
                    return Ok(false);
                }
                if from.parents.contains(&child) {
                    return Err(DomainError::InvalidState {
                        reason: format!("{child} is already a parent of {parent}"),
                    });
                }
                if to.parents.len() >= MAX_PARENTS {
                    return Err(DomainError::InvalidState {
                        reason: format!("{child} already has {MAX_PARENTS} parents"),
                    });
                }
                Ok(true)
            }
            Relationship::Spouse { a, b } => {
                if from.spouse == Some(b) {
                    return Ok(false);
                }
                if let Some(current) = from.spouse {
                    return Err(DomainError::SpouseConflict {
                        person: a.to_string(),
                        spouse: current.to_string(),
                    });
                }
                if let Some(current) = to.spouse {
                    return Err(DomainError::SpouseConflict {
                        person: b.to_string(),
                        spouse: current.to_string(),
                    });
                }
                Ok(true)
            }
        }
    }

    /// 判断是否与另一条边等价（`Spouse` 忽略方向）
    pub fn same_as(&self, other: &Relationship) -> bool {
        match (self, other) {
            (Relationship::ParentOf { .. }, Relationship::ParentOf { .. }) => self == other,
            (Relationship::Spouse { a, b }, Relationship::Spouse { a: c, b: d }) => {
                (a == c && b == d) || (a == d && b == c)
            }
            _ => false,
        }
    }
}

/// 某个人员的亲属视图（由边推导）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kinship {
    /// 出边 PARENT_OF，按建立顺序
    pub children: Vec<PersonId>,
    /// 入边 PARENT_OF，按建立顺序
    pub parents: Vec<PersonId>,
    pub spouse: Option<PersonId>,
}

impl Kinship {
    /// 从边集合推导 `id` 的亲属视图
    pub fn derive<'a>(id: PersonId, edges: impl IntoIterator<Item = &'a Relationship>) -> Self {
        let mut kinship = Kinship::default();
        for edge in edges {
            kinship.absorb(id, edge);
        }
        kinship
    }

    /// 吸收一条边（与 `id` 无关的边被忽略）
    pub fn absorb(&mut self, id: PersonId, edge: &Relationship) {
        match *edge {
            Relationship::ParentOf { parent, child } if parent == id => self.children.push(child),
            Relationship::ParentOf { parent, child } if child == id => self.parents.push(parent),
            Relationship::Spouse { a, b } if a == id && self.spouse.is_none() => {
                self.spouse = Some(b)
            }
            Relationship::Spouse { a, b } if b == id && self.spouse.is_none() => {
                self.spouse = Some(a)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinship_derives_both_directions() {
        let (wh, dilsia, oliver, mary) = (
            PersonId::generate(),
            PersonId::generate(),
            PersonId::generate(),
            PersonId::generate(),
        );
        let edges = [
            Relationship::parent_of(wh, oliver),
            Relationship::parent_of(dilsia, oliver),
            Relationship::parent_of(oliver, mary),
            Relationship::spouse(wh, dilsia),
        ];

        let k = Kinship::derive(oliver, &edges);
        assert_eq!(k.parents, vec![wh, dilsia]);
        assert_eq!(k.children, vec![mary]);
        assert_eq!(k.spouse, None);

        assert_eq!(Kinship::derive(dilsia, &edges).spouse, Some(wh));
        assert_eq!(Kinship::derive(wh, &edges).spouse, Some(dilsia));
    }

    #[test]
    fn check_enforces_single_spouse() {
        let (a, b, c) = (PersonId::generate(), PersonId::generate(), PersonId::generate());
        let married = [Relationship::spouse(a, b)];
        let ka = Kinship::derive(a, &married);
        let kb = Kinship::derive(b, &married);
        let kc = Kinship::derive(c, &married);

        // 重复建立是幂等的
        assert!(!Relationship::spouse(b, a).check(&kb, &ka).unwrap());

        match Relationship::spouse(c, a).check(&kc, &ka).unwrap_err() {
            DomainError::SpouseConflict { person, spouse } => {
                assert_eq!(person, a.to_string());
                assert_eq!(spouse, b.to_string());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn check_limits_parents_and_rejects_inversion() {
        let (p1, p2, p3, child) = (
            PersonId::generate(),
            PersonId::generate(),
            PersonId::generate(),
            PersonId::generate(),
        );
        let edges = [
            Relationship::parent_of(p1, child),
            Relationship::parent_of(p2, child),
        ];
        let kc = Kinship::derive(child, &edges);

        let err = Relationship::parent_of(p3, child)
            .check(&Kinship::default(), &kc)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));

        assert!(!Relationship::parent_of(p1, child)
            .check(&Kinship::derive(p1, &edges), &kc)
            .unwrap());

        let err = Relationship::parent_of(child, p1)
            .check(&kc, &Kinship::derive(p1, &edges))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
    }

    #[test]
    fn spouse_equivalence_ignores_direction() {
        let (a, b) = (PersonId::generate(), PersonId::generate());
        assert!(Relationship::spouse(a, b).same_as(&Relationship::spouse(b, a)));
        assert!(!Relationship::parent_of(a, b).same_as(&Relationship::parent_of(b, a)));
        assert!(!Relationship::parent_of(a, b).same_as(&Relationship::spouse(a, b)));
    }

    #[test]
    fn self_edges_are_rejected() {
        let a = PersonId::generate();
        assert!(Relationship::spouse(a, a).validate().is_err());
        assert!(Relationship::parent_of(a, a).validate().is_err());
        assert!(Relationship::parent_of(a, PersonId::generate()).validate().is_ok());
    }

    #[test]
    fn serde_uses_kind_tag() {
        let (a, b) = (PersonId::generate(), PersonId::generate());
        let json = serde_json::to_value(Relationship::parent_of(a, b)).unwrap();
        assert_eq!(json["kind"], "PARENT_OF");
        assert_eq!(json["parent"], a.to_string());

        let kind: RelationshipKind = serde_json::from_str("\"SPOUSE\"").unwrap();
        assert_eq!(kind, RelationshipKind::Spouse);
        assert_eq!(
            Relationship::from_kind(kind, a, b),
            Relationship::spouse(a, b)
        );
    }
}
