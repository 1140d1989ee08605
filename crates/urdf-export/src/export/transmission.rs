//! Transmissions fragment: one simple effort transmission per moving joint

use crate::config::ExportConfig;
use crate::tree::ResolvedTree;

use super::xml::XmlDoc;

const TRANSMISSION_TYPE: &str = "transmission_interface/SimpleTransmission";
const HARDWARE_INTERFACE: &str = "hardware_interface/EffortJointInterface";

/// Render `<robot>.trans`
pub fn write_transmissions(tree: &ResolvedTree, config: &ExportConfig) -> std::io::Result<String> {
    let mut doc = XmlDoc::robot(&config.robot_name)?;
    for joint in tree.joints.iter().filter(|j| j.joint_type.is_actuated()) {
        doc.start("transmission", &[("name", format!("{}_tran", joint.name).as_str())])?;
        doc.text_element("type", TRANSMISSION_TYPE)?;

        doc.start("joint", &[("name", joint.name.as_str())])?;
        doc.text_element("hardwareInterface", HARDWARE_INTERFACE)?;
        doc.end("joint")?;

        doc.start("actuator", &[("name", format!("{}_actr", joint.name).as_str())])?;
        doc.text_element("hardwareInterface", HARDWARE_INTERFACE)?;
        doc.text_element("mechanicalReduction", "1")?;
        doc.end("actuator")?;

        doc.end("transmission")?;
    }
    doc.finish()
}
