//! Type prototype reference table.
//!
//! Every type assigns each of the 8 cognitive functions to exactly one of the
//! 8 roles. The default table is fixed reference data; callers may override
//! individual types (from config) or supply a whole table (from storage rows).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::CognitiveFunction::{self, Fe, Fi, Ne, Ni, Se, Si, Te, Ti};
use crate::entities::{Role, TypeCode};
use crate::error::{PrismError, Result};

const BAS: Role = Role::Base;
const CRE: Role = Role::Creative;
const ROL: Role = Role::Role;
const VUL: Role = Role::Vulnerable;
const MOB: Role = Role::Mobilizing;
const SUG: Role = Role::Suggestive;
const IGN: Role = Role::Ignoring;
const DEM: Role = Role::Demonstrative;

type Assignment = [(CognitiveFunction, Role); 8];

const DEFAULT_ASSIGNMENTS: [(TypeCode, Assignment); 16] = [
    (TypeCode::Lie, [(Te, BAS), (Ni, CRE), (Se, ROL), (Fi, VUL), (Ti, MOB), (Ne, SUG), (Si, IGN), (Fe, DEM)]),
    (TypeCode::Ili, [(Ni, BAS), (Te, CRE), (Fi, ROL), (Se, VUL), (Ne, MOB), (Ti, SUG), (Fe, IGN), (Si, DEM)]),
    (TypeCode::Ese, [(Fe, BAS), (Si, CRE), (Ne, ROL), (Ti, VUL), (Fi, MOB), (Ni, SUG), (Te, IGN), (Se, DEM)]),
    (TypeCode::Sei, [(Si, BAS), (Fe, CRE), (Ti, ROL), (Ne, VUL), (Ni, MOB), (Fi, SUG), (Se, IGN), (Te, DEM)]),
    (TypeCode::Lii, [(Ti, BAS), (Ne, CRE), (Ni, ROL), (Fe, VUL), (Te, MOB), (Si, SUG), (Fi, IGN), (Se, DEM)]),
    (TypeCode::Ile, [(Ne, BAS), (Ti, CRE), (Fe, ROL), (Ni, VUL), (Si, MOB), (Te, SUG), (Se, IGN), (Fi, DEM)]),
    (TypeCode::Esi, [(Fi, BAS), (Se, CRE), (Ni, ROL), (Te, VUL), (Fe, MOB), (Ne, SUG), (Ti, IGN), (Si, DEM)]),
    (TypeCode::See, [(Se, BAS), (Fi, CRE), (Te, ROL), (Ni, VUL), (Ne, MOB), (Fe, SUG), (Si, IGN), (Ti, DEM)]),
    (TypeCode::Lse, [(Te, BAS), (Si, CRE), (Se, ROL), (Fi, VUL), (Ti, MOB), (Ne, SUG), (Ni, IGN), (Fe, DEM)]),
    (TypeCode::Sli, [(Si, BAS), (Te, CRE), (Fi, ROL), (Se, VUL), (Ni, MOB), (Ti, SUG), (Fe, IGN), (Ne, DEM)]),
    (TypeCode::Eie, [(Fe, BAS), (Ni, CRE), (Ne, ROL), (Ti, VUL), (Fi, MOB), (Si, SUG), (Te, IGN), (Se, DEM)]),
    (TypeCode::Iei, [(Ni, BAS), (Fe, CRE), (Ti, ROL), (Ne, VUL), (Si, MOB), (Fi, SUG), (Se, IGN), (Te, DEM)]),
    (TypeCode::Lsi, [(Ti, BAS), (Se, CRE), (Ni, ROL), (Fe, VUL), (Te, MOB), (Ne, SUG), (Fi, IGN), (Si, DEM)]),
    (TypeCode::Sle, [(Se, BAS), (Ti, CRE), (Fe, ROL), (Ni, VUL), (Ne, MOB), (Te, SUG), (Si, IGN), (Fi, DEM)]),
    (TypeCode::Eii, [(Fi, BAS), (Ne, CRE), (Ni, ROL), (Te, VUL), (Fe, MOB), (Si, SUG), (Se, IGN), (Ti, DEM)]),
    (TypeCode::Iee, [(Ne, BAS), (Fi, CRE), (Te, ROL), (Ni, VUL), (Si, MOB), (Fe, SUG), (Se, IGN), (Ti, DEM)]),
];

/// Wire form of a table: `type → {function → role}`.
pub type PrototypeMap = BTreeMap<TypeCode, BTreeMap<CognitiveFunction, Role>>;

/// One stored `(type_code, func, block)` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrototypeRow {
    pub type_code: String,
    pub func: String,
    pub block: String,
}

/// Dense 16×8 role table indexed by [`TypeCode::index`] and [`CognitiveFunction::index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrototypeMap", into = "PrototypeMap")]
pub struct PrototypeTable {
    roles: [[Role; 8]; 16],
}

impl Default for PrototypeTable {
    fn default() -> Self {
        let mut roles = [[Role::Ignoring; 8]; 16];
        for (code, assignment) in DEFAULT_ASSIGNMENTS.iter() {
            for (func, role) in assignment.iter() {
                roles[code.index()][func.index()] = *role;
            }
        }
        Self { roles }
    }
}

impl PrototypeTable {
    /// Shared instance of the default table.
    pub fn fallback() -> &'static PrototypeTable {
        use std::sync::OnceLock;
        static FALLBACK: OnceLock<PrototypeTable> = OnceLock::new();
        FALLBACK.get_or_init(PrototypeTable::default)
    }

    /// Role held by `func` inside `code`.
    pub fn role(&self, code: TypeCode, func: CognitiveFunction) -> Role {
        self.roles[code.index()][func.index()]
    }

    /// The 8 `(function, role)` pairs of a type, in canonical function order.
    pub fn assignment(&self, code: TypeCode) -> impl Iterator<Item = (CognitiveFunction, Role)> + '_ {
        CognitiveFunction::ALL
            .iter()
            .map(move |&f| (f, self.roles[code.index()][f.index()]))
    }

    /// The function occupying `role` in `code`. Tables are permutations, so this always exists.
    pub fn function_in(&self, code: TypeCode, role: Role) -> CognitiveFunction {
        self.assignment(code)
            .find(|(_, r)| *r == role)
            .map(|(f, _)| f)
            .unwrap_or(CognitiveFunction::ALL[0])
    }

    /// Replace the types named in `overrides`; every other type keeps the default entry.
    pub fn with_overrides(overrides: &PrototypeMap) -> Result<Self> {
        let mut table = Self::default();
        for (code, funcs) in overrides {
            table.roles[code.index()] = dense_assignment(*code, funcs)?;
        }
        Ok(table)
    }

    /// Build a complete table from stored rows. Requires exactly 16×8 rows.
    pub fn from_rows(rows: &[PrototypeRow]) -> Result<Self> {
        if rows.len() != 16 * 8 {
            return Err(PrismError::Config(format!(
                "expected {} prototype rows, got {}",
                16 * 8,
                rows.len()
            )));
        }

        let mut map = PrototypeMap::new();
        for row in rows {
            let code: TypeCode = row.type_code.parse()?;
            let func: CognitiveFunction = row.func.parse()?;
            let role: Role = row.block.parse()?;
            map.entry(code).or_default().insert(func, role);
        }

        if let Some(missing) = TypeCode::ALL.iter().find(|t| !map.contains_key(*t)) {
            return Err(PrismError::InvalidPrototype {
                code: missing.to_string(),
                reason: "no rows for type".to_string(),
            });
        }
        Self::with_overrides(&map)
    }

    /// Check every type against its canonical base/creative pair.
    pub fn validate_canonical(&self) -> Result<()> {
        for code in TypeCode::ALL {
            let base = self.function_in(code, Role::Base);
            let creative = self.function_in(code, Role::Creative);
            if (base, creative) != code.leading_pair() {
                return Err(PrismError::InvalidPrototype {
                    code: code.to_string(),
                    reason: format!(
                        "base/creative {base}/{creative}, expected {}/{}",
                        code.base(),
                        code.creative()
                    ),
                });
            }
            if !base.valid_creatives().contains(&creative) {
                return Err(PrismError::InvalidPrototype {
                    code: code.to_string(),
                    reason: format!("{creative} cannot be creative to {base}"),
                });
            }
        }
        Ok(())
    }

    pub fn to_map(&self) -> PrototypeMap {
        TypeCode::ALL
            .iter()
            .map(|&code| (code, self.assignment(code).collect()))
            .collect()
    }
}

fn dense_assignment(code: TypeCode, funcs: &BTreeMap<CognitiveFunction, Role>) -> Result<[Role; 8]> {
    let mut roles = [Role::Ignoring; 8];
    let mut used = [false; 8];
    for func in CognitiveFunction::ALL {
        let role = funcs.get(&func).copied().ok_or_else(|| PrismError::InvalidPrototype {
            code: code.to_string(),
            reason: format!("missing role for {func}"),
        })?;
        let slot = Role::ALL.iter().position(|r| *r == role).unwrap_or(0);
        if used[slot] {
            return Err(PrismError::InvalidPrototype {
                code: code.to_string(),
                reason: format!("role {role} assigned twice"),
            });
        }
        used[slot] = true;
        roles[func.index()] = role;
    }
    Ok(roles)
}

impl TryFrom<PrototypeMap> for PrototypeTable {
    type Error = PrismError;

    fn try_from(map: PrototypeMap) -> Result<Self> {
        Self::with_overrides(&map)
    }
}

impl From<PrototypeTable> for PrototypeMap {
    fn from(table: PrototypeTable) -> Self {
        table.to_map()
    }
}
