//! Codepoint allocation.
//!
//! Decides the codepoint for each icon name in arrival order. One of three
//! modes applies per run:
//!
//! - **Persisted**: names found in a previously saved glyph map keep their
//!   codepoint; new names continue past the highest saved codepoint.
//! - **Fixed**: names listed in `fixedCodepoints` use that value; the rest
//!   count up from `firstGlyph`.
//! - **Default**: every name counts up from `firstGlyph`.
//!
//! Codepoints reserved by the fixed mapping or the glyph map are never minted
//! for a different name, and two distinct icons never share a codepoint.

use std::collections::{HashMap, HashSet};

use crate::config::{FixedCodepoints, IconConfig};
use crate::error::{IconError, Result};
use crate::types::{CodePoint, GlyphEntry};

/// Counters threaded through one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationState {
    /// Next value handed out by the `firstGlyph` counter.
    pub next_glyph: CodePoint,
    /// Highest codepoint known in persisted-map mode, if any was saved.
    pub last_assigned: Option<CodePoint>,
}

/// Where an assigned codepoint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Freshly minted from a counter.
    Minted,
    /// Taken from `fixedCodepoints`.
    Fixed,
    /// Reused from the persisted glyph map.
    Persisted,
    /// Name already assigned earlier in this run.
    Repeated,
}

#[derive(Debug)]
enum Mode {
    Default,
    Fixed(FixedCodepoints),
    Persisted(HashMap<String, CodePoint>),
}

/// Hands out codepoints for icon names.
#[derive(Debug)]
pub struct CodepointAllocator {
    mode: Mode,
    state: AllocationState,
    reserved: HashSet<CodePoint>,
    claimed: HashMap<CodePoint, String>,
    assigned: HashMap<String, CodePoint>,
}

impl CodepointAllocator {
    /// Default mode: count up from `first_glyph`.
    pub fn new(first_glyph: CodePoint) -> Self {
        Self::with_mode(first_glyph, Mode::Default, HashSet::new(), None)
    }

    /// Fixed mode: inline overrides, counting up from `first_glyph` otherwise.
    pub fn fixed(first_glyph: CodePoint, fixed: FixedCodepoints) -> Self {
        if fixed.is_empty() {
            return Self::new(first_glyph);
        }
        let reserved = fixed.iter().map(|(_, cp)| cp).collect();
        Self::with_mode(first_glyph, Mode::Fixed(fixed), reserved, None)
    }

    /// Persisted mode: reuse saved codepoints, mint past the highest one.
    pub fn persisted(first_glyph: CodePoint, saved: &[GlyphEntry]) -> Self {
        let reserved: HashSet<CodePoint> = saved.iter().map(|g| g.code_point).collect();
        let last_assigned = reserved.iter().copied().max();

        let mut known = HashMap::new();
        for glyph in saved.iter().filter(|g| !g.is_alias()) {
            known.entry(glyph.file_name.clone()).or_insert(glyph.code_point);
        }

        Self::with_mode(first_glyph, Mode::Persisted(known), reserved, last_assigned)
    }

    /// Pick the mode from the config. `saved` is the loaded glyph map, if
    /// persisted-map mode is on.
    pub fn from_config(config: &IconConfig, saved: Option<&[GlyphEntry]>) -> Self {
        match saved {
            Some(saved) => Self::persisted(config.first_glyph, saved),
            None => Self::fixed(config.first_glyph, config.fixed_codepoints.clone()),
        }
    }

    fn with_mode(
        first_glyph: CodePoint,
        mode: Mode,
        reserved: HashSet<CodePoint>,
        last_assigned: Option<CodePoint>,
    ) -> Self {
        Self {
            mode,
            state: AllocationState {
                next_glyph: first_glyph,
                last_assigned,
            },
            reserved,
            claimed: HashMap::new(),
            assigned: HashMap::new(),
        }
    }

    /// Current counter state.
    pub fn state(&self) -> AllocationState {
        self.state
    }

    /// Codepoint assigned to `file_name` so far in this run.
    pub fn assigned(&self, file_name: &str) -> Option<CodePoint> {
        self.assigned.get(file_name).copied()
    }

    /// Assign a codepoint to `file_name`.
    ///
    /// A name keeps its codepoint for the rest of the run once assigned.
    pub fn allocate(&mut self, file_name: &str) -> Result<(CodePoint, Assignment)> {
        if let Some(code_point) = self.assigned(file_name) {
            return Ok((code_point, Assignment::Repeated));
        }

        let known = match &self.mode {
            Mode::Persisted(known) => known.get(file_name).map(|&cp| (cp, Assignment::Persisted)),
            Mode::Fixed(fixed) => fixed.get(file_name).map(|cp| (cp, Assignment::Fixed)),
            Mode::Default => None,
        };

        let (code_point, assignment) = match known {
            Some(found) => found,
            None if matches!(self.mode, Mode::Persisted(_)) => {
                (self.mint_persisted()?, Assignment::Minted)
            }
            None => (self.mint()?, Assignment::Minted),
        };

        if let Some(owner) = self.claimed.get(&code_point) {
            return Err(IconError::Collision {
                code_point: code_point.to_string(),
                file_name: file_name.to_string(),
                claimed_by: owner.clone(),
            });
        }

        self.claimed.insert(code_point, file_name.to_string());
        self.assigned.insert(file_name.to_string(), code_point);
        Ok((code_point, assignment))
    }

    /// Mint from the `firstGlyph` counter.
    fn mint(&mut self) -> Result<CodePoint> {
        let code_point = self.first_free(Some(self.state.next_glyph))?;
        self.state.next_glyph = code_point.next().unwrap_or(CodePoint::MAX);
        Ok(code_point)
    }

    /// Mint one past the highest persisted codepoint, or from the counter
    /// when the glyph map was empty.
    fn mint_persisted(&mut self) -> Result<CodePoint> {
        match self.state.last_assigned {
            Some(last) => {
                let code_point = self.first_free(last.next())?;
                self.state.last_assigned = Some(code_point);
                Ok(code_point)
            }
            None => self.mint(),
        }
    }

    /// First codepoint at or after `start` that is neither reserved nor claimed.
    fn first_free(&self, start: Option<CodePoint>) -> Result<CodePoint> {
        let mut candidate = start;
        while let Some(code_point) = candidate {
            if !self.reserved.contains(&code_point) && !self.claimed.contains_key(&code_point) {
                return Ok(code_point);
            }
            candidate = code_point.next();
        }
        Err(IconError::config(
            format!("No codepoints left to assign after {}", CodePoint::MAX),
            Some("Lower firstGlyph or remove unused glyphs from the glyph map"),
        ))
    }
}
