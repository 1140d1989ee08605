//! Materials fragment

use crate::assembly::MaterialRecord;
use crate::config::ExportConfig;
use crate::tree::ResolvedTree;

use super::xml::XmlDoc;

/// Distinct link materials in first-reference order
pub fn collect_materials(tree: &ResolvedTree) -> Vec<&MaterialRecord> {
    let mut materials: Vec<&MaterialRecord> = Vec::new();
    for link in &tree.links {
        if !materials.iter().any(|m| m.name == link.material.name) {
            materials.push(&link.material);
        }
    }
    materials
}

fn rgba_attr(rgba: [f64; 4]) -> String {
    rgba.iter()
        .map(|c| format!("{:.3}", c))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render `materials.xacro`
pub fn write_materials_xacro(tree: &ResolvedTree, config: &ExportConfig) -> std::io::Result<String> {
    let mut doc = XmlDoc::robot(&config.robot_name)?;
    for material in collect_materials(tree) {
        doc.start("material", &[("name", material.name.as_str())])?;
        doc.empty("color", &[("rgba", rgba_attr(material.rgba).as_str())])?;
        doc.end("material")?;
    }
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inertia::InertiaMatrix;
    use crate::inertial::InertialRecord;
    use crate::transform::RigidTransform;
    use crate::tree::ResolvedLink;
    use glam::DVec3;

    fn link(name: &str, material: MaterialRecord) -> ResolvedLink {
        ResolvedLink {
            name: name.to_string(),
            mesh_stem: name.to_string(),
            material,
            frame: RigidTransform::IDENTITY,
            inertial: InertialRecord::new(1.0, DVec3::ZERO, InertiaMatrix::default()),
        }
    }

    #[test]
    fn test_distinct_in_first_reference_order() {
        let red = MaterialRecord::new("red", [1.0, 0.0, 0.0, 1.0]);
        let tree = ResolvedTree {
            links: vec![
                link("a", red.clone()),
                link("b", MaterialRecord::silver()),
                link("c", red),
            ],
            joints: Vec::new(),
        };
        let names: Vec<_> = collect_materials(&tree).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["red", "silver"]);

        let text = write_materials_xacro(&tree, &ExportConfig::default()).unwrap();
        assert!(text.contains(r#"<color rgba="0.700 0.700 0.700 1.000"/>"#));
        assert!(text.find("\"red\"") < text.find("\"silver\""));
    }
}
