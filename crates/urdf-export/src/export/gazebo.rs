//! Simulation fragment for Gazebo

use crate::config::ExportConfig;
use crate::tree::{ResolvedLink, ResolvedTree};

use super::xml::XmlDoc;

const FRICTION: &str = "0.2";
const BODY_COLOR: &str = "body_color";
const FALLBACK_COLOR: &str = "Gazebo/Grey";

/// Materials shipped with Gazebo's `gazebo.material` script
const STOCK_MATERIALS: &[&str] = &[
    "Grey",
    "DarkGrey",
    "White",
    "FlatBlack",
    "Black",
    "Red",
    "RedBright",
    "Green",
    "Blue",
    "SkyBlue",
    "Yellow",
    "ZincYellow",
    "DarkYellow",
    "Purple",
    "Turquoise",
    "Orange",
    "Indigo",
    "Gold",
    "Wood",
];

/// Stock Gazebo material for an appearance name (`dark grey` -> `Gazebo/DarkGrey`).
///
/// Matching ignores case and non-alphanumeric characters. Appearances with no
/// stock counterpart give `None`.
pub fn gazebo_material_name(material: &str) -> Option<String> {
    let key: String = material
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    STOCK_MATERIALS
        .iter()
        .find(|stock| stock.to_ascii_lowercase() == key)
        .map(|stock| format!("Gazebo/{}", stock))
}

fn link_material(link: &ResolvedLink, config: &ExportConfig) -> String {
    if link.material.name == config.default_material.name {
        return format!("${{{}}}", BODY_COLOR);
    }
    gazebo_material_name(&link.material.name).unwrap_or_else(|| format!("${{{}}}", BODY_COLOR))
}

/// Render `<robot>.gazebo`.
///
/// Inertial data is not repeated here; the simulator takes it from the main
/// document, which includes this fragment.
pub fn write_gazebo(tree: &ResolvedTree, config: &ExportConfig) -> std::io::Result<String> {
    let mut doc = XmlDoc::robot(&config.robot_name)?;

    let body_color = gazebo_material_name(&config.default_material.name)
        .unwrap_or_else(|| FALLBACK_COLOR.to_string());
    doc.empty(
        "xacro:property",
        &[("name", BODY_COLOR), ("value", body_color.as_str())],
    )?;

    doc.start("gazebo", &[])?;
    doc.empty(
        "plugin",
        &[
            ("name", config.dialect.plugin_name()),
            ("filename", config.dialect.plugin_filename()),
        ],
    )?;
    doc.end("gazebo")?;

    for (index, link) in tree.links.iter().enumerate() {
        doc.start("gazebo", &[("reference", link.name.as_str())])?;
        doc.text_element("material", &link_material(link, config))?;
        doc.text_element("mu1", FRICTION)?;
        doc.text_element("mu2", FRICTION)?;
        doc.text_element("self_collide", "true")?;
        if index == 0 {
            doc.text_element("gravity", "true")?;
        }
        doc.end("gazebo")?;
    }

    doc.finish()
}
