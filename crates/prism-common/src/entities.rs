/// Core domain types for the typing model.
/// Cognitive functions, the roles they occupy inside a type, and the 16 type codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrismError;

// ---------------------------------------------------------------------------
// Cognitive function
// ---------------------------------------------------------------------------

/// One of the 8 information-processing tags.
/// Declaration order is the canonical iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CognitiveFunction {
    Ti,
    Te,
    Fi,
    Fe,
    Ni,
    Ne,
    Si,
    Se,
}

impl CognitiveFunction {
    pub const ALL: [CognitiveFunction; 8] = [
        CognitiveFunction::Ti,
        CognitiveFunction::Te,
        CognitiveFunction::Fi,
        CognitiveFunction::Fe,
        CognitiveFunction::Ni,
        CognitiveFunction::Ne,
        CognitiveFunction::Si,
        CognitiveFunction::Se,
    ];

    /// Position in [`CognitiveFunction::ALL`]; used to index fixed-size arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveFunction::Ti => "Ti",
            CognitiveFunction::Te => "Te",
            CognitiveFunction::Fi => "Fi",
            CognitiveFunction::Fe => "Fe",
            CognitiveFunction::Ni => "Ni",
            CognitiveFunction::Ne => "Ne",
            CognitiveFunction::Si => "Si",
            CognitiveFunction::Se => "Se",
        }
    }

    /// Thinking and feeling are rational; intuition and sensing are not.
    pub fn is_rational(self) -> bool {
        matches!(
            self,
            CognitiveFunction::Ti | CognitiveFunction::Te | CognitiveFunction::Fi | CognitiveFunction::Fe
        )
    }

    pub fn is_introverted(self) -> bool {
        matches!(
            self,
            CognitiveFunction::Ti | CognitiveFunction::Fi | CognitiveFunction::Ni | CognitiveFunction::Si
        )
    }

    /// Creatives a base function may pair with: opposite rationality, opposite attitude.
    pub fn valid_creatives(self) -> [CognitiveFunction; 2] {
        use CognitiveFunction::*;
        match self {
            Ne | Se => [Ti, Fi],
            Ni | Si => [Te, Fe],
            Ti | Fi => [Ne, Se],
            Te | Fe => [Ni, Si],
        }
    }
}

impl fmt::Display for CognitiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CognitiveFunction {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CognitiveFunction::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| PrismError::UnknownFunction(s.to_string()))
    }
}

impl TryFrom<String> for CognitiveFunction {
    type Error = PrismError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CognitiveFunction> for String {
    fn from(f: CognitiveFunction) -> Self {
        f.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Structural position a function occupies inside a type prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Base,
    Creative,
    Role,
    Vulnerable,
    Mobilizing,
    Suggestive,
    Ignoring,
    Demonstrative,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Base,
        Role::Creative,
        Role::Role,
        Role::Vulnerable,
        Role::Mobilizing,
        Role::Suggestive,
        Role::Ignoring,
        Role::Demonstrative,
    ];

    /// Weight applied to a function's strength when scoring a prototype.
    pub fn weight(&self) -> f64 {
        match self {
            Role::Base     => 1.0,
            Role::Creative => 0.7,
            _              => 0.2,
        }
    }

    /// Strength a well-fitting respondent is expected to show in this role.
    pub fn expected_strength(&self) -> f64 {
        match self {
            Role::Base     => 4.5,
            Role::Creative => 3.5,
            _              => 2.5,
        }
    }

    pub fn quadrant(&self) -> Quadrant {
        match self {
            Role::Base | Role::Creative          => Quadrant::Core,
            Role::Role | Role::Vulnerable        => Quadrant::Critic,
            Role::Mobilizing | Role::Suggestive  => Quadrant::Hidden,
            Role::Ignoring | Role::Demonstrative => Quadrant::Instinct,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Base          => "base",
            Role::Creative      => "creative",
            Role::Role          => "role",
            Role::Vulnerable    => "vulnerable",
            Role::Mobilizing    => "mobilizing",
            Role::Suggestive    => "suggestive",
            Role::Ignoring      => "ignoring",
            Role::Demonstrative => "demonstrative",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PrismError::UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = PrismError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        r.as_str().to_string()
    }
}

/// Roles grouped pairwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Quadrant {
    Core,
    Critic,
    Hidden,
    Instinct,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::Core, Quadrant::Critic, Quadrant::Hidden, Quadrant::Instinct];
}

// ---------------------------------------------------------------------------
// Type code
// ---------------------------------------------------------------------------

/// One of the 16 type prototypes.
/// Variants are declared alphabetically so the derived `Ord` is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeCode {
    Eie,
    Eii,
    Ese,
    Esi,
    Iee,
    Iei,
    Ile,
    Ili,
    Lie,
    Lii,
    Lse,
    Lsi,
    See,
    Sei,
    Sle,
    Sli,
}

impl TypeCode {
    pub const ALL: [TypeCode; 16] = [
        TypeCode::Eie,
        TypeCode::Eii,
        TypeCode::Ese,
        TypeCode::Esi,
        TypeCode::Iee,
        TypeCode::Iei,
        TypeCode::Ile,
        TypeCode::Ili,
        TypeCode::Lie,
        TypeCode::Lii,
        TypeCode::Lse,
        TypeCode::Lsi,
        TypeCode::See,
        TypeCode::Sei,
        TypeCode::Sle,
        TypeCode::Sli,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::Eie => "EIE",
            TypeCode::Eii => "EII",
            TypeCode::Ese => "ESE",
            TypeCode::Esi => "ESI",
            TypeCode::Iee => "IEE",
            TypeCode::Iei => "IEI",
            TypeCode::Ile => "ILE",
            TypeCode::Ili => "ILI",
            TypeCode::Lie => "LIE",
            TypeCode::Lii => "LII",
            TypeCode::Lse => "LSE",
            TypeCode::Lsi => "LSI",
            TypeCode::See => "SEE",
            TypeCode::Sei => "SEI",
            TypeCode::Sle => "SLE",
            TypeCode::Sli => "SLI",
        }
    }

    /// Canonical (base, creative) pair. No two types share a pair.
    pub fn leading_pair(self) -> (CognitiveFunction, CognitiveFunction) {
        use CognitiveFunction::*;
        match self {
            TypeCode::Lie => (Te, Ni),
            TypeCode::Ili => (Ni, Te),
            TypeCode::Ese => (Fe, Si),
            TypeCode::Sei => (Si, Fe),
            TypeCode::Lii => (Ti, Ne),
            TypeCode::Ile => (Ne, Ti),
            TypeCode::Esi => (Fi, Se),
            TypeCode::See => (Se, Fi),
            TypeCode::Lse => (Te, Si),
            TypeCode::Sli => (Si, Te),
            TypeCode::Eie => (Fe, Ni),
            TypeCode::Iei => (Ni, Fe),
            TypeCode::Lsi => (Ti, Se),
            TypeCode::Sle => (Se, Ti),
            TypeCode::Eii => (Fi, Ne),
            TypeCode::Iee => (Ne, Fi),
        }
    }

    pub fn base(self) -> CognitiveFunction {
        self.leading_pair().0
    }

    pub fn creative(self) -> CognitiveFunction {
        self.leading_pair().1
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeCode {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeCode::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PrismError::UnknownTypeCode(s.to_string()))
    }
}

impl TryFrom<String> for TypeCode {
    type Error = PrismError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeCode> for String {
    fn from(t: TypeCode) -> Self {
        t.as_str().to_string()
    }
}
