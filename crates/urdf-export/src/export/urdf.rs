//! Main robot description document

use crate::config::ExportConfig;
use crate::tree::{ResolvedJoint, ResolvedLink, ResolvedTree};
use crate::types::Pose;

use super::xml::{XmlDoc, fmt_num, fmt_triple};
use super::{
    ANGLE_DECIMALS, CM_PER_M, INERTIA_DECIMALS_SI, KG_CM2_PER_KG_M2, LENGTH_DECIMALS,
    MASS_DECIMALS, gazebo_file_name, materials_file_name, transmissions_file_name,
};

fn origin_attrs(pose: &Pose) -> (String, String) {
    let xyz = pose.xyz.map(|v| v / CM_PER_M);
    (
        fmt_triple(xyz, LENGTH_DECIMALS),
        fmt_triple(pose.rpy, ANGLE_DECIMALS),
    )
}

fn write_origin(doc: &mut XmlDoc, pose: &Pose) -> std::io::Result<()> {
    let (xyz, rpy) = origin_attrs(pose);
    doc.empty("origin", &[("xyz", xyz.as_str()), ("rpy", rpy.as_str())])
}

fn write_mesh_geometry(
    doc: &mut XmlDoc,
    link: &ResolvedLink,
    config: &ExportConfig,
) -> std::io::Result<()> {
    let uri = config.mesh_uri(&link.mesh_stem);
    let scale = fmt_triple([config.mesh_scale; 3], LENGTH_DECIMALS);
    doc.start("geometry", &[])?;
    doc.empty("mesh", &[("filename", uri.as_str()), ("scale", scale.as_str())])?;
    doc.end("geometry")
}

fn write_link(doc: &mut XmlDoc, link: &ResolvedLink, config: &ExportConfig) -> std::io::Result<()> {
    doc.start("link", &[("name", link.name.as_str())])?;

    let inertial = &link.inertial;
    doc.start("inertial", &[])?;
    write_origin(doc, &Pose::from_position(inertial.center_of_mass.to_array()))?;
    doc.empty("mass", &[("value", fmt_num(inertial.mass, MASS_DECIMALS).as_str())])?;
    let [ixx, iyy, izz, ixy, iyz, ixz] =
        inertial
            .inertia
            .to_components()
            .map(|v| fmt_num(v / KG_CM2_PER_KG_M2, INERTIA_DECIMALS_SI));
    doc.empty(
        "inertia",
        &[
            ("ixx", ixx.as_str()),
            ("iyy", iyy.as_str()),
            ("izz", izz.as_str()),
            ("ixy", ixy.as_str()),
            ("iyz", iyz.as_str()),
            ("ixz", ixz.as_str()),
        ],
    )?;
    doc.end("inertial")?;

    let mesh_origin = link.mesh_origin();
    doc.start("visual", &[])?;
    write_origin(doc, &mesh_origin)?;
    write_mesh_geometry(doc, link, config)?;
    doc.empty("material", &[("name", link.material.name.as_str())])?;
    doc.end("visual")?;

    doc.start("collision", &[])?;
    write_origin(doc, &mesh_origin)?;
    write_mesh_geometry(doc, link, config)?;
    doc.end("collision")?;

    doc.end("link")
}

fn write_joint(doc: &mut XmlDoc, joint: &ResolvedJoint) -> std::io::Result<()> {
    let joint_type = joint.joint_type;
    doc.start(
        "joint",
        &[("name", joint.name.as_str()), ("type", joint_type.urdf_name())],
    )?;
    write_origin(doc, &joint.origin)?;
    doc.empty("parent", &[("link", joint.parent.as_str())])?;
    doc.empty("child", &[("link", joint.child.as_str())])?;

    if joint_type.has_axis() {
        let axis = fmt_triple(joint.axis.to_array(), ANGLE_DECIMALS);
        doc.empty("axis", &[("xyz", axis.as_str())])?;
    }

    if let Some(limits) = joint.limits.filter(|_| joint_type.has_limits()) {
        let scale = if joint_type.is_linear() { CM_PER_M } else { 1.0 };
        let effort = fmt_num(limits.effort, LENGTH_DECIMALS);
        let velocity = fmt_num(limits.velocity, LENGTH_DECIMALS);
        match limits.range() {
            Some((lower, upper)) => {
                let upper = fmt_num(upper / scale, LENGTH_DECIMALS);
                let lower = fmt_num(lower / scale, LENGTH_DECIMALS);
                doc.empty(
                    "limit",
                    &[
                        ("upper", upper.as_str()),
                        ("lower", lower.as_str()),
                        ("effort", effort.as_str()),
                        ("velocity", velocity.as_str()),
                    ],
                )?;
            }
            None => {
                doc.empty(
                    "limit",
                    &[("effort", effort.as_str()), ("velocity", velocity.as_str())],
                )?;
            }
        }
    }

    doc.end("joint")
}

/// Render the main `<robot>.xacro` document: includes, then links, then joints
pub fn write_robot_xacro(tree: &ResolvedTree, config: &ExportConfig) -> std::io::Result<String> {
    let mut doc = XmlDoc::robot(&config.robot_name)?;

    let mut includes = vec![materials_file_name(), transmissions_file_name(config)];
    if config.simulation {
        includes.push(gazebo_file_name(config));
    }
    for file in includes {
        doc.empty("xacro:include", &[("filename", config.include_path(&file).as_str())])?;
    }

    for link in &tree.links {
        write_link(&mut doc, link, config)?;
    }
    for joint in &tree.joints {
        write_joint(&mut doc, joint)?;
    }

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::MaterialRecord;
    use crate::inertia::InertiaMatrix;
    use crate::inertial::InertialRecord;
    use crate::transform::RigidTransform;
    use crate::types::{JointLimits, JointType};
    use glam::DVec3;

    fn sample_tree() -> ResolvedTree {
        let link = |name: &str, x: f64| ResolvedLink {
            name: name.to_string(),
            mesh_stem: name.to_string(),
            material: MaterialRecord::silver(),
            frame: RigidTransform::from_translation(DVec3::new(-x, 0.0, 0.0)),
            inertial: InertialRecord::new(
                1.5,
                DVec3::new(0.0, 0.0, 2.0),
                InertiaMatrix::from_components([100.0, 200.0, 300.0, 0.0, 0.0, 0.0]),
            ),
        };
        ResolvedTree {
            links: vec![link("base_link", 0.0), link("slide", 10.0)],
            joints: vec![ResolvedJoint {
                name: "Slider1".to_string(),
                joint_type: JointType::Prismatic,
                parent: "base_link".to_string(),
                child: "slide".to_string(),
                origin: Pose::from_position([10.0, 0.0, 0.0]),
                axis: DVec3::X,
                limits: Some(JointLimits::with_range(0.0, 25.0)),
            }],
        }
    }

    #[test]
    fn test_units_converted_to_si() {
        let text = write_robot_xacro(&sample_tree(), &ExportConfig::default()).unwrap();
        assert!(text.contains(r#"<origin xyz="0 0 0.02" rpy="0 0 0"/>"#));
        assert!(text.contains(r#"<mass value="1.5"/>"#));
        assert!(text.contains(r#"<inertia ixx="0.01" iyy="0.02" izz="0.03" ixy="0" iyz="0" ixz="0"/>"#));
        assert!(text.contains(r#"<origin xyz="0.1 0 0" rpy="0 0 0"/>"#));
        assert!(text.contains(r#"<limit upper="0.25" lower="0" effort="100" velocity="100"/>"#));
    }

    #[test]
    fn test_mesh_reference_and_visual_origin() {
        let text = write_robot_xacro(&sample_tree(), &ExportConfig::default()).unwrap();
        assert!(text.contains(
            r#"<mesh filename="package://robot_description/meshes/slide.stl" scale="0.001 0.001 0.001"/>"#
        ));
        assert!(text.contains(r#"<origin xyz="-0.1 0 0" rpy="0 0 0"/>"#));
        assert!(text.contains(r#"<material name="silver"/>"#));
    }

    #[test]
    fn test_includes_follow_simulation_flag() {
        let tree = sample_tree();
        let with = write_robot_xacro(&tree, &ExportConfig::default()).unwrap();
        assert!(with.contains(r#"<xacro:include filename="$(find robot_description)/urdf/materials.xacro"/>"#));
        assert!(with.contains("robot.trans"));
        assert!(with.contains("robot.gazebo"));

        let without =
            write_robot_xacro(&tree, &ExportConfig::default().with_simulation(false)).unwrap();
        assert!(!without.contains("robot.gazebo"));
    }

    #[test]
    fn test_fixed_joint_has_no_axis_or_limit() {
        let mut tree = sample_tree();
        tree.joints[0].joint_type = JointType::Fixed;
        tree.joints[0].limits = None;
        let text = write_robot_xacro(&tree, &ExportConfig::default()).unwrap();
        assert!(text.contains(r#"<joint name="Slider1" type="fixed">"#));
        assert!(!text.contains("<axis"));
        assert!(!text.contains("<limit"));
    }
}
