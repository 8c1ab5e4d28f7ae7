//! Flat-text rendering of a BRD.
//!
//! Deterministic, fixed section order. Both the "PDF" and "DOCX" downloads
//! serve this same text under different filenames; real binary formats are a
//! known gap, not a goal here.

use std::fmt::Write;

use crate::models::BrdContent;

/// Serialize every field of the BRD into numbered sections.
pub fn render_brd(brd: &BrdContent) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "BUSINESS REQUIREMENTS DOCUMENT");
    let _ = writeln!(out, "{}", brd.title);
    let _ = writeln!(out, "{}", brd.subtitle);

    let _ = writeln!(out, "\n1. PROJECT OVERVIEW");
    let _ = writeln!(out, "{}", brd.project_overview);

    let _ = writeln!(out, "\n2. BUSINESS OBJECTIVES");
    for (i, objective) in brd.business_objectives.iter().enumerate() {
        let _ = writeln!(out, "{}. {objective}", i + 1);
    }

    let _ = writeln!(out, "\n3. SCOPE & DELIVERABLES");
    let _ = writeln!(out, "\nIn Scope:");
    for item in &brd.scope.in_scope {
        let _ = writeln!(out, "• {item}");
    }
    let _ = writeln!(out, "\nOut of Scope:");
    for item in &brd.scope.out_of_scope {
        let _ = writeln!(out, "• {item}");
    }

    let _ = writeln!(out, "\n4. FUNCTIONAL REQUIREMENTS");
    for req in &brd.functional_requirements {
        let _ = writeln!(out, "{}: {}", req.id, req.title);
        let _ = writeln!(out, "  Description: {}", req.description);
        let _ = writeln!(out, "  Priority: {}", req.priority.as_str().to_uppercase());
    }

    let _ = writeln!(out, "\n5. NON-FUNCTIONAL REQUIREMENTS");
    for req in &brd.non_functional_requirements {
        let _ = writeln!(out, "{}: {}", req.id, req.title);
        let _ = writeln!(out, "  Category: {}", req.category);
        let _ = writeln!(out, "  Description: {}", req.description);
    }

    let _ = writeln!(out, "\n6. STAKEHOLDERS");
    for stakeholder in &brd.stakeholders {
        let _ = writeln!(out, "• {} ({})", stakeholder.name, stakeholder.role);
        let _ = writeln!(out, "    Responsibility: {}", stakeholder.responsibility);
    }

    let _ = writeln!(out, "\n7. CONSTRAINTS & ASSUMPTIONS");
    let _ = writeln!(out, "\nConstraints:");
    for constraint in &brd.constraints {
        let _ = writeln!(out, "• {constraint}");
    }
    let _ = writeln!(out, "\nAssumptions:");
    for assumption in &brd.assumptions {
        let _ = writeln!(out, "• {assumption}");
    }

    out
}

/// Whitespace-collapsing word count; empty tokens are never counted.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
