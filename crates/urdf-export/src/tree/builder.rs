//! Build a validated kinematic tree from assembly occurrences and joints

use std::collections::{HashMap, HashSet, VecDeque};

use glam::DVec3;

use crate::assembly::{AssemblySource, JointRecord, MaterialRecord, Occurrence, SourceJointKind};
use crate::config::ExportConfig;
use crate::error::{ExportError, MalformedReason, Result};
use crate::inertia::round_to;
use crate::inertial::aggregate_bodies;
use crate::naming::{link_name_for, mesh_stem_for};
use crate::types::{JointLimits, JointType};

use super::{KinematicTree, Link, TreeJoint};

/// Decimal digits kept on joint limits (rad, or cm for sliders)
pub const LIMIT_DECIMALS: i32 = 6;

/// Occurrences that become links, in host order.
///
/// An occurrence with no visible bodies that is never the parent of a joint
/// contributes nothing and is dropped.
pub fn prune_occurrences<S: AssemblySource + ?Sized>(source: &S) -> Vec<&Occurrence> {
    let parents: HashSet<&str> = source.joints().iter().map(|j| j.parent.as_str()).collect();
    source
        .occurrences()
        .iter()
        .filter(|occ| {
            let keep = occ.visible_bodies().next().is_some() || parents.contains(occ.name.as_str());
            if !keep {
                tracing::debug!("Pruning occurrence '{}' (no visible bodies, no children)", occ.name);
            }
            keep
        })
        .collect()
}

/// Build the kinematic tree of an assembly.
///
/// Every structural and numeric check runs here, before anything is
/// serialized. Traversal is breadth-first from the root, visiting each link's
/// child joints in the order they appear in the host's joint list.
pub fn build_tree<S: AssemblySource + ?Sized>(
    source: &S,
    config: &ExportConfig,
) -> Result<KinematicTree> {
    let root_link_name = config.root_link_name.as_str();

    // occurrence name -> link name, over all occurrences so joints to pruned
    // ones can be told apart from joints to unknown ones
    let link_names: HashMap<&str, String> = source
        .occurrences()
        .iter()
        .map(|occ| (occ.name.as_str(), link_name_for(occ, root_link_name)))
        .collect();

    let survivors = prune_occurrences(source);
    let surviving: HashSet<&str> = survivors.iter().map(|o| o.name.as_str()).collect();

    // only links that reach the document need unique names
    let mut seen_links: HashSet<&str> = HashSet::new();
    for occ in &survivors {
        let name = link_names[occ.name.as_str()].as_str();
        if !seen_links.insert(name) {
            return Err(ExportError::malformed(MalformedReason::DuplicateLinkName(
                name.to_string(),
            )));
        }
    }

    let mut joints: Vec<TreeJoint> = Vec::new();
    let mut joint_names: HashSet<&str> = HashSet::new();
    for record in source.joints() {
        for occ in [&record.parent, &record.child] {
            if !link_names.contains_key(occ.as_str()) {
                return Err(ExportError::malformed(MalformedReason::UnknownLink {
                    joint: record.name.clone(),
                    link: occ.clone(),
                }));
            }
        }
        if !surviving.contains(record.child.as_str()) {
            tracing::debug!(
                "Dropping joint '{}': child '{}' was pruned",
                record.name,
                record.child
            );
            continue;
        }
        if !joint_names.insert(record.name.as_str()) {
            return Err(ExportError::malformed(MalformedReason::DuplicateJointName(
                record.name.clone(),
            )));
        }
        joints.push(convert_joint(record, &link_names)?);
    }

    let link_order = traverse(&survivors, &link_names, &joints)?;

    let root = &link_order.links[0];
    if root != root_link_name {
        return Err(ExportError::MissingRootLink {
            expected: root_link_name.to_string(),
            found: Some(root.clone()),
        });
    }

    let by_link: HashMap<&str, &Occurrence> = survivors
        .iter()
        .map(|occ| (link_names[occ.name.as_str()].as_str(), *occ))
        .collect();
    let mut links = Vec::with_capacity(link_order.links.len());
    for name in &link_order.links {
        let occ = by_link[name.as_str()];
        let inertial = aggregate_bodies(name, occ.visible_bodies())?;
        links.push(Link {
            name: name.clone(),
            occurrence: occ.name.clone(),
            mesh_stem: mesh_stem_for(name, root_link_name),
            material: resolve_material(source, occ, config),
            inertial,
        });
    }

    let ordered_joints: Vec<TreeJoint> = link_order
        .joints
        .into_iter()
        .map(|i| joints[i].clone())
        .collect();

    tracing::info!(
        "Built kinematic tree rooted at '{}': {} links, {} joints",
        root_link_name,
        links.len(),
        ordered_joints.len()
    );
    Ok(KinematicTree::from_ordered(links, ordered_joints))
}

/// Map a host joint onto the description's joint vocabulary
fn convert_joint(record: &JointRecord, link_names: &HashMap<&str, String>) -> Result<TreeJoint> {
    let name = record.name.clone();
    let is_moving = matches!(record.kind, SourceJointKind::Revolute | SourceJointKind::Slider);
    let joint_type = JointType::from_source(record.kind, record.lower.is_some() && record.upper.is_some())
        .ok_or_else(|| ExportError::UnsupportedJointType {
            joint: name.clone(),
            kind: record.kind,
        })?;

    if is_moving {
        match (record.lower, record.upper) {
            (Some(_), None) => {
                return Err(ExportError::IncompleteLimits {
                    joint: name,
                    missing: "upper",
                });
            }
            (None, Some(_)) => {
                return Err(ExportError::IncompleteLimits {
                    joint: name,
                    missing: "lower",
                });
            }
            _ => {}
        }
    }

    let axis = if joint_type.has_axis() {
        let raw = DVec3::from(record.axis);
        let length = raw.length();
        if !length.is_finite() || length < 1e-12 {
            return Err(ExportError::DegenerateAxis { joint: name });
        }
        if (length - 1.0).abs() > 1e-6 {
            tracing::warn!("Joint '{}' axis {:?} is not unit length, normalizing", name, raw);
        }
        raw / length
    } else {
        DVec3::Z
    };

    let limits = match joint_type {
        JointType::Revolute | JointType::Prismatic => Some(match record.lower.zip(record.upper) {
            Some((lower, upper)) => JointLimits::with_range(
                round_to(lower, LIMIT_DECIMALS),
                round_to(upper, LIMIT_DECIMALS),
            ),
            None => JointLimits::unbounded(),
        }),
        JointType::Continuous => {
            tracing::debug!("Joint '{}' has no limits, emitting as continuous", name);
            None
        }
        JointType::Fixed => None,
    };

    Ok(TreeJoint {
        name,
        joint_type,
        parent: link_names[record.parent.as_str()].clone(),
        child: link_names[record.child.as_str()].clone(),
        origin: record.origin,
        axis,
        limits,
    })
}

/// Breadth-first visit order of links and joints (indices into the joint list)
struct Traversal {
    links: Vec<String>,
    joints: Vec<usize>,
}

fn traverse(
    survivors: &[&Occurrence],
    link_names: &HashMap<&str, String>,
    joints: &[TreeJoint],
) -> Result<Traversal> {
    let mut parent_of: HashMap<&str, usize> = HashMap::new();
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, joint) in joints.iter().enumerate() {
        if joint.parent == joint.child {
            return Err(ExportError::malformed(MalformedReason::Cycle(vec![
                joint.parent.clone(),
                joint.child.clone(),
            ])));
        }
        if let Some(&first) = parent_of.get(joint.child.as_str()) {
            return Err(ExportError::malformed(MalformedReason::DuplicateParent {
                link: joint.child.clone(),
                joints: [joints[first].name.clone(), joint.name.clone()],
            }));
        }
        parent_of.insert(joint.child.as_str(), i);
        children.entry(joint.parent.as_str()).or_default().push(i);
    }

    let link_list: Vec<&str> = survivors
        .iter()
        .map(|occ| link_names[occ.name.as_str()].as_str())
        .collect();
    let roots: Vec<&str> = link_list
        .iter()
        .copied()
        .filter(|name| !parent_of.contains_key(name))
        .collect();

    let root = match roots.as_slice() {
        [root] => *root,
        [] if !link_list.is_empty() => {
            let start = joints.first().map(|j| j.child.as_str()).unwrap_or(link_list[0]);
            return Err(ExportError::malformed(MalformedReason::Cycle(find_cycle(
                start, &parent_of, joints,
            ))));
        }
        _ => {
            return Err(ExportError::NoUniqueRoot {
                candidates: roots.iter().map(|s| s.to_string()).collect(),
            });
        }
    };

    let mut order = Traversal {
        links: vec![root.to_string()],
        joints: Vec::with_capacity(joints.len()),
    };
    let mut visited: HashSet<&str> = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(link) = queue.pop_front() {
        for &i in children.get(link).map(Vec::as_slice).unwrap_or_default() {
            let child = joints[i].child.as_str();
            if visited.insert(child) {
                tracing::debug!("Attaching '{}' to '{}' via '{}'", child, link, joints[i].name);
                order.links.push(child.to_string());
                order.joints.push(i);
                queue.push_back(child);
            }
        }
    }

    if let Some(stray) = joints.iter().find(|j| !visited.contains(j.child.as_str())) {
        let cycle = find_cycle(stray.child.as_str(), &parent_of, joints);
        let reason = if cycle.is_empty() {
            MalformedReason::Disconnected {
                joint: stray.name.clone(),
            }
        } else {
            MalformedReason::Cycle(cycle)
        };
        return Err(ExportError::malformed(reason));
    }

    Ok(order)
}

/// Follow parent joints from `start`; returns the closed loop (child to
/// parent, first link repeated at the end) if one is hit
fn find_cycle(start: &str, parent_of: &HashMap<&str, usize>, joints: &[TreeJoint]) -> Vec<String> {
    let mut path: Vec<&str> = Vec::new();
    let mut current = start;
    loop {
        if let Some(pos) = path.iter().position(|&name| name == current) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(current.to_string());
            return cycle;
        }
        path.push(current);
        match parent_of.get(current) {
            Some(&i) => current = joints[i].parent.as_str(),
            None => return Vec::new(),
        }
    }
}

/// Appearance of an occurrence, falling back to the configured default
fn resolve_material<S: AssemblySource + ?Sized>(
    source: &S,
    occ: &Occurrence,
    config: &ExportConfig,
) -> MaterialRecord {
    match occ.material.as_deref() {
        None => config.default_material.clone(),
        Some(name) => match source.materials().iter().find(|m| m.name == name) {
            Some(material) => material.clone(),
            None => {
                tracing::warn!(
                    "Occurrence '{}' references unknown material '{}', using '{}'",
                    occ.name,
                    name,
                    config.default_material.name
                );
                config.default_material.clone()
            }
        },
    }
}
