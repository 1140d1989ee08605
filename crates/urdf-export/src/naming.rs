//! Link and mesh naming rules

use crate::assembly::Occurrence;

/// Mesh stem forced onto any link whose name mentions it
pub const BASE_LINK: &str = "base_link";

/// Replace characters that are not valid in link names (`' '`, `':'`, `'('`, `')'`) with `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | ':' | '(' | ')' => '_',
            c => c,
        })
        .collect()
}

/// Link name of an occurrence; the root component keeps the bare root link name
pub fn link_name_for(occurrence: &Occurrence, root_link_name: &str) -> String {
    if occurrence.component_name() == root_link_name {
        root_link_name.to_string()
    } else {
        sanitize_name(&occurrence.name)
    }
}

/// File stem of a link's mesh
pub fn mesh_stem_for(link_name: &str, root_link_name: &str) -> String {
    if link_name == root_link_name {
        root_link_name.to_string()
    } else if link_name.contains(BASE_LINK) {
        // the host's mesh export writes these files as base_link.stl
        BASE_LINK.to_string()
    } else {
        sanitize_name(link_name)
    }
}
