//! RF2 release tables (concepts, descriptions, association refsets).
//!
//! Every RF2 table is a full history: a component appears once per change,
//! stamped with an `effectiveTime`. The tables here index rows by component
//! and answer "what is the latest state" queries over that history.

use std::path::Path;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::errors::DatasetError;
use crate::transport::tsv::read_rows;
use crate::types::{ComponentId, Term};

/// Identifiers from the ontology's metadata hierarchy that drive extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OntologyCode {
    /// Module holding relationships and descriptive metadata concepts.
    ModelComponentModule,
    /// Description type of alternative labels.
    SynonymDescription,
    /// Description type of the preferred (fully specified) label.
    FullySpecifiedName,
    PossiblyEquivalentToRefset,
    SameAsRefset,
    ReplacedByRefset,
}

impl OntologyCode {
    pub const ALL: [OntologyCode; 6] = [
        Self::ModelComponentModule,
        Self::SynonymDescription,
        Self::FullySpecifiedName,
        Self::PossiblyEquivalentToRefset,
        Self::SameAsRefset,
        Self::ReplacedByRefset,
    ];

    pub const fn code(self) -> ComponentId {
        match self {
            Self::ModelComponentModule => 900_000_000_000_012_004,
            Self::SynonymDescription => 900_000_000_000_013_009,
            Self::FullySpecifiedName => 900_000_000_000_003_001,
            Self::PossiblyEquivalentToRefset => 900_000_000_000_523_009,
            Self::SameAsRefset => 900_000_000_000_527_005,
            Self::ReplacedByRefset => 900_000_000_000_526_001,
        }
    }

    pub fn from_code(code: ComponentId) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.code() == code)
    }
}

/// Reason a retired concept points at its substitute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubstitutionKind {
    PossiblyEquivalentTo,
    SameAs,
    ReplacedBy,
}

impl SubstitutionKind {
    pub const ALL: [SubstitutionKind; 3] =
        [Self::PossiblyEquivalentTo, Self::SameAs, Self::ReplacedBy];

    /// Kind for an association refset id; `None` for refsets not used here.
    pub fn from_refset(refset_id: ComponentId) -> Option<Self> {
        match OntologyCode::from_code(refset_id)? {
            OntologyCode::PossiblyEquivalentToRefset => Some(Self::PossiblyEquivalentTo),
            OntologyCode::SameAsRefset => Some(Self::SameAs),
            OntologyCode::ReplacedByRefset => Some(Self::ReplacedBy),
            _ => None,
        }
    }

    pub fn refset(self) -> OntologyCode {
        match self {
            Self::PossiblyEquivalentTo => OntologyCode::PossiblyEquivalentToRefset,
            Self::SameAs => OntologyCode::SameAsRefset,
            Self::ReplacedBy => OntologyCode::ReplacedByRefset,
        }
    }

    /// Partition family name the pairs of this kind are saved under.
    pub fn partition_base(self) -> &'static str {
        use crate::constants::partitions::{POSSIBLY_EQUIVALENT_TO, REPLACED_BY, SAME_AS};
        match self {
            Self::PossiblyEquivalentTo => POSSIBLY_EQUIVALENT_TO,
            Self::SameAs => SAME_AS,
            Self::ReplacedBy => REPLACED_BY,
        }
    }
}

fn effective_time<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").map_err(serde::de::Error::custom)
}

fn active_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected active flag 0 or 1, found '{other}'"
        ))),
    }
}

/// One row of the concept history table.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRow {
    pub id: ComponentId,
    #[serde(deserialize_with = "effective_time")]
    pub effective_time: NaiveDate,
    #[serde(deserialize_with = "active_flag")]
    pub active: bool,
    pub module_id: ComponentId,
}

/// One row of the description (label) history table.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionRow {
    pub id: ComponentId,
    #[serde(deserialize_with = "effective_time")]
    pub effective_time: NaiveDate,
    #[serde(deserialize_with = "active_flag")]
    pub active: bool,
    pub concept_id: ComponentId,
    pub type_id: ComponentId,
    pub term: Term,
}

/// One row of the association refset history table.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRow {
    pub id: String,
    #[serde(deserialize_with = "effective_time")]
    pub effective_time: NaiveDate,
    #[serde(deserialize_with = "active_flag")]
    pub active: bool,
    pub module_id: ComponentId,
    pub refset_id: ComponentId,
    pub referenced_component_id: ComponentId,
    pub target_component_id: ComponentId,
}

/// Latest row by effective time; the first such row wins a tie.
fn latest<'a, T, F>(rows: &'a [T], time: F) -> Option<&'a T>
where
    F: Fn(&T) -> NaiveDate,
{
    rows.iter().fold(None, |best: Option<&'a T>, row| match best {
        Some(current) if time(current) >= time(row) => Some(current),
        _ => Some(row),
    })
}

/// Concept history indexed by concept id (file order preserved).
#[derive(Clone, Debug, Default)]
pub struct ConceptTable {
    by_id: IndexMap<ComponentId, Vec<ConceptRow>>,
}

impl ConceptTable {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        Ok(Self::from_rows(read_rows(path)?))
    }

    pub fn from_rows(rows: Vec<ConceptRow>) -> Self {
        let mut by_id: IndexMap<ComponentId, Vec<ConceptRow>> = IndexMap::new();
        for row in rows {
            by_id.entry(row.id).or_default().push(row);
        }
        Self { by_id }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Concept ids in first-appearance order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.by_id.keys().copied()
    }

    pub fn latest(&self, id: ComponentId) -> Option<&ConceptRow> {
        latest(self.by_id.get(&id)?, |row| row.effective_time)
    }

    /// Latest state is active and outside the model-component module.
    pub fn is_active_clinical(&self, id: ComponentId) -> bool {
        self.latest(id).is_some_and(|row| {
            row.active && row.module_id != OntologyCode::ModelComponentModule.code()
        })
    }
}

/// Current preferred label and alternative labels of a concept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConceptLabels {
    pub preferred: Vec<Term>,
    pub alternatives: Vec<Term>,
}

/// Description history indexed by concept, then by description id.
#[derive(Clone, Debug, Default)]
pub struct DescriptionTable {
    by_concept: IndexMap<ComponentId, IndexMap<ComponentId, Vec<DescriptionRow>>>,
}

impl DescriptionTable {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        Ok(Self::from_rows(read_rows(path)?))
    }

    pub fn from_rows(rows: Vec<DescriptionRow>) -> Self {
        let mut by_concept: IndexMap<ComponentId, IndexMap<ComponentId, Vec<DescriptionRow>>> =
            IndexMap::new();
        for row in rows {
            by_concept
                .entry(row.concept_id)
                .or_default()
                .entry(row.id)
                .or_default()
                .push(row);
        }
        Self { by_concept }
    }

    /// Current labels of a concept.
    ///
    /// A description counts when its latest entry is active. Its entries at that
    /// latest time must name exactly one label, either preferred or alternative.
    pub fn current_labels(&self, concept: ComponentId) -> Result<ConceptLabels, DatasetError> {
        let mut labels = ConceptLabels::default();
        let Some(descriptions) = self.by_concept.get(&concept) else {
            return Ok(labels);
        };
        for (description_id, history) in descriptions {
            let Some(last) = latest(history, |row| row.effective_time) else {
                continue;
            };
            if !last.active {
                continue;
            }
            let current: Vec<&DescriptionRow> = history
                .iter()
                .filter(|row| row.effective_time == last.effective_time)
                .collect();
            let preferred: Vec<&DescriptionRow> = current
                .iter()
                .copied()
                .filter(|row| row.type_id == OntologyCode::FullySpecifiedName.code())
                .collect();
            let alternatives: Vec<&DescriptionRow> = current
                .iter()
                .copied()
                .filter(|row| row.type_id == OntologyCode::SynonymDescription.code())
                .collect();
            match (preferred.as_slice(), alternatives.as_slice()) {
                ([row], []) => labels.preferred.push(row.term.clone()),
                ([], [row]) => labels.alternatives.push(row.term.clone()),
                ([], []) => {
                    return Err(DatasetError::Ontology(format!(
                        "description {description_id} of concept {concept} is neither preferred nor alternative"
                    )));
                }
                _ => {
                    return Err(DatasetError::Ontology(format!(
                        "description {description_id} of concept {concept} has conflicting entries at {}",
                        last.effective_time
                    )));
                }
            }
        }
        Ok(labels)
    }

    /// The single current preferred label of a concept.
    ///
    /// Considers each description's latest entry only; it must be active and
    /// of the fully-specified-name type.
    pub fn preferred_label(&self, concept: ComponentId) -> Result<&str, DatasetError> {
        let mut found: Vec<&str> = Vec::new();
        if let Some(descriptions) = self.by_concept.get(&concept) {
            for history in descriptions.values() {
                if let Some(last) = latest(history, |row| row.effective_time)
                    && last.active
                    && last.type_id == OntologyCode::FullySpecifiedName.code()
                {
                    found.push(last.term.as_str());
                }
            }
        }
        match found.as_slice() {
            [label] => Ok(*label),
            [] => Err(DatasetError::Ontology(format!(
                "no preferred label found for concept {concept}"
            ))),
            many => Err(DatasetError::Ontology(format!(
                "concept {concept} has {} preferred labels: {many:?}",
                many.len()
            ))),
        }
    }
}

/// An active substitution between two concepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Substitution {
    pub source: ComponentId,
    pub target: ComponentId,
    pub kind: SubstitutionKind,
}

/// Association refset history.
#[derive(Clone, Debug, Default)]
pub struct AssociationTable {
    rows: Vec<AssociationRow>,
}

impl AssociationTable {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        Ok(Self::from_rows(read_rows(path)?))
    }

    pub fn from_rows(rows: Vec<AssociationRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Active substitutions outside the model-component module, in file order.
    ///
    /// Each (source, target) concept pair is judged by the refset of its first
    /// row; it is kept when the latest row for that (source, target, refset)
    /// is active and the refset is one of the substitution kinds.
    pub fn substitutions(&self) -> Vec<Substitution> {
        let mut histories: IndexMap<
            (ComponentId, ComponentId),
            (ComponentId, Vec<&AssociationRow>),
        > = IndexMap::new();
        for row in self
            .rows
            .iter()
            .filter(|row| row.module_id != OntologyCode::ModelComponentModule.code())
        {
            let entry = histories
                .entry((row.referenced_component_id, row.target_component_id))
                .or_insert_with(|| (row.refset_id, Vec::new()));
            if row.refset_id == entry.0 {
                entry.1.push(row);
            }
        }

        histories
            .into_iter()
            .filter_map(|((source, target), (refset_id, history))| {
                let kind = SubstitutionKind::from_refset(refset_id)?;
                let last = latest(&history, |row| row.effective_time)?;
                last.active.then_some(Substitution {
                    source,
                    target,
                    kind,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y%m%d").unwrap()
    }

    fn description(
        id: u64,
        time: &str,
        active: bool,
        concept: u64,
        kind: OntologyCode,
        term: &str,
    ) -> DescriptionRow {
        DescriptionRow {
            id,
            effective_time: date(time),
            active,
            concept_id: concept,
            type_id: kind.code(),
            term: term.to_string(),
        }
    }

    #[test]
    fn codes_round_trip_and_reject_unknown_values() {
        for code in OntologyCode::ALL {
            assert_eq!(OntologyCode::from_code(code.code()), Some(code));
        }
        assert_eq!(OntologyCode::from_code(138875005), None);
        assert_eq!(
            SubstitutionKind::from_refset(OntologyCode::SameAsRefset.code()),
            Some(SubstitutionKind::SameAs)
        );
        assert_eq!(
            SubstitutionKind::from_refset(OntologyCode::FullySpecifiedName.code()),
            None
        );
    }

    #[test]
    fn concept_latest_state_decides_activity() {
        let table = ConceptTable::from_rows(vec![
            ConceptRow {
                id: 1,
                effective_time: date("20020131"),
                active: true,
                module_id: 900000000000207008,
            },
            ConceptRow {
                id: 1,
                effective_time: date("20100131"),
                active: false,
                module_id: 900000000000207008,
            },
            ConceptRow {
                id: 2,
                effective_time: date("20020131"),
                active: true,
                module_id: OntologyCode::ModelComponentModule.code(),
            },
            ConceptRow {
                id: 3,
                effective_time: date("20020131"),
                active: true,
                module_id: 900000000000207008,
            },
        ]);
        assert_eq!(table.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(!table.is_active_clinical(1));
        assert!(!table.is_active_clinical(2));
        assert!(table.is_active_clinical(3));
        assert!(!table.is_active_clinical(4));
    }

    #[test]
    fn current_labels_use_latest_description_state() {
        use OntologyCode::{FullySpecifiedName as Fsn, SynonymDescription as Syn};

        let table = DescriptionTable::from_rows(vec![
            description(10, "20020131", true, 1, Fsn, "Asthma (disorder)"),
            description(11, "20020131", true, 1, Syn, "Asthmatic"),
            description(11, "20150731", false, 1, Syn, "Asthmatic"),
            description(12, "20020131", true, 1, Syn, "Bronchial asthma"),
            description(13, "20020131", true, 1, Fsn, "Old name"),
            description(13, "20070131", true, 1, Syn, "Old name"),
        ]);
        let labels = table.current_labels(1).unwrap();
        assert_eq!(labels.preferred, vec!["Asthma (disorder)"]);
        assert_eq!(labels.alternatives, vec!["Bronchial asthma", "Old name"]);
        assert_eq!(table.preferred_label(1).unwrap(), "Asthma (disorder)");
    }

    #[test]
    fn conflicting_and_missing_preferred_labels_are_errors() {
        let table = DescriptionTable::from_rows(vec![
            description(10, "20020131", true, 1, OntologyCode::FullySpecifiedName, "A (finding)"),
            description(11, "20020131", true, 1, OntologyCode::FullySpecifiedName, "B (finding)"),
            description(20, "20020131", true, 2, OntologyCode::SynonymDescription, "C"),
            description(30, "20020131", true, 3, OntologyCode::FullySpecifiedName, "D"),
            description(30, "20020131", true, 3, OntologyCode::SynonymDescription, "D"),
        ]);
        assert!(matches!(table.preferred_label(1), Err(DatasetError::Ontology(_))));
        assert!(matches!(table.preferred_label(2), Err(DatasetError::Ontology(_))));
        assert!(matches!(table.current_labels(3), Err(DatasetError::Ontology(_))));
    }

    fn association(
        time: &str,
        active: bool,
        refset: OntologyCode,
        source: u64,
        target: u64,
    ) -> AssociationRow {
        AssociationRow {
            id: format!("{source}-{target}-{time}"),
            effective_time: date(time),
            active,
            module_id: 900000000000207008,
            refset_id: refset.code(),
            referenced_component_id: source,
            target_component_id: target,
        }
    }

    #[test]
    fn substitutions_keep_latest_active_associations() {
        let mut model_row = association("20020131", true, OntologyCode::SameAsRefset, 7, 8);
        model_row.module_id = OntologyCode::ModelComponentModule.code();
        let table = AssociationTable::from_rows(vec![
            association("20020131", true, OntologyCode::ReplacedByRefset, 1, 2),
            association("20020131", true, OntologyCode::SameAsRefset, 3, 4),
            association("20090731", false, OntologyCode::SameAsRefset, 3, 4),
            association("20020131", true, OntologyCode::PossiblyEquivalentToRefset, 5, 6),
            association("20020131", true, OntologyCode::FullySpecifiedName, 9, 10),
            model_row,
        ]);
        assert_eq!(
            table.substitutions(),
            vec![
                Substitution {
                    source: 1,
                    target: 2,
                    kind: SubstitutionKind::ReplacedBy
                },
                Substitution {
                    source: 5,
                    target: 6,
                    kind: SubstitutionKind::PossiblyEquivalentTo
                },
            ]
        );
    }

    #[test]
    fn rows_deserialize_from_rf2_tables() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("concepts.txt");
        std::fs::write(
            &path,
            "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
             22298006\t20020131\t1\t900000000000207008\t900000000000074008\n",
        )
        .unwrap();
        let table = ConceptTable::load(&path).unwrap();
        let row = table.latest(22298006).unwrap();
        assert_eq!(row.effective_time, date("20020131"));
        assert!(row.active);

        std::fs::write(
            &path,
            "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
             22298006\t20020131\tyes\t900000000000207008\t900000000000074008\n",
        )
        .unwrap();
        assert!(matches!(ConceptTable::load(&path), Err(DatasetError::Csv(_))));
    }
}
