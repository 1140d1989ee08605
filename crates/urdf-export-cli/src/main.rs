//! `cad2urdf`: export CAD assembly snapshots as ROS description packages
//!
//! # Commands
//!
//! - `cad2urdf export <snapshot> -o <dir>` - write the full package
//! - `cad2urdf check <snapshot>` - validate and print the kinematic tree
//! - `cad2urdf print <snapshot>` - print one rendered document to stdout
//! - `cad2urdf init-config <snapshot> <file>` - write the derived config as RON
//! - `cad2urdf inspect <description>` - read a written description back

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use urdf_export::{
    AssemblySnapshot, AssemblySource, Dialect, ExportConfig, NoMeshExporter, StlMeshExporter,
    build_robot, export_package, read_description_file,
};

#[derive(Parser)]
#[command(name = "cad2urdf")]
#[command(about = "Export CAD assembly snapshots as URDF/xacro description packages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the description package (meshes, documents, launch files)
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Directory the package directory is created in
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Skip writing STL meshes
        #[arg(long)]
        no_meshes: bool,
    },

    /// Validate the assembly and print the resulting tree
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print a rendered document to stdout
    Print {
        #[command(flatten)]
        input: InputArgs,

        /// Which document to print
        #[arg(long, value_enum, default_value_t = DocumentKind::Robot)]
        document: DocumentKind,
    },

    /// Write the configuration derived for a snapshot, for later editing
    InitConfig {
        /// Snapshot file (.ron or .json)
        snapshot: PathBuf,

        /// Where to write the RON config
        output: PathBuf,
    },

    /// Read a generated robot description and list its links and joints
    Inspect {
        /// Robot document (.xacro or .urdf)
        description: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Snapshot file (.ron or .json)
    snapshot: PathBuf,

    /// Export configuration (RON); derived from the snapshot when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// ROS version of the generated package
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    ros: Option<u8>,

    /// Omit the Gazebo fragment and its include
    #[arg(long)]
    no_gazebo: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentKind {
    Robot,
    Materials,
    Transmissions,
    Gazebo,
}

fn load_snapshot(path: &Path) -> Result<AssemblySnapshot> {
    AssemblySnapshot::load(path).with_context(|| format!("Failed to load snapshot {:?}", path))
}

impl InputArgs {
    fn load(&self) -> Result<(AssemblySnapshot, ExportConfig)> {
        let snapshot = load_snapshot(&self.snapshot)?;

        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => ExportConfig::for_robot(snapshot.root_component_name()),
        };
        match self.ros {
            Some(1) => config.dialect = Dialect::Ros1,
            Some(2) => config.dialect = Dialect::Ros2,
            _ => {}
        }
        if self.no_gazebo {
            config.simulation = false;
        }
        Ok((snapshot, config))
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urdf_export=info,cad2urdf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            no_meshes,
        } => {
            let (snapshot, config) = input.load()?;
            let report = if no_meshes {
                export_package(&snapshot, &config, &output, &NoMeshExporter)
            } else {
                export_package(&snapshot, &config, &output, &StlMeshExporter::default())
            }
            .with_context(|| format!("Failed to export '{}'", config.robot_name))?;

            println!(
                "Generated {} package at {}",
                config.dialect.display_name(),
                report.package_root.display()
            );
        }

        Commands::Check { input } => {
            let (snapshot, config) = input.load()?;
            let model = build_robot(&snapshot, &config)
                .with_context(|| format!("Invalid assembly {:?}", input.snapshot))?;

            println!(
                "{}: {} links, {} joints",
                config.robot_name,
                model.tree.link_count(),
                model.tree.joint_count()
            );
            for joint in model.tree.joints() {
                println!(
                    "  {} ({}): {} -> {}",
                    joint.name,
                    joint.joint_type.urdf_name(),
                    joint.parent,
                    joint.child
                );
            }
        }

        Commands::Print { input, document } => {
            let (snapshot, config) = input.load()?;
            let model = build_robot(&snapshot, &config)
                .with_context(|| format!("Invalid assembly {:?}", input.snapshot))?;
            let docs = model.documents;

            let text = match document {
                DocumentKind::Robot => docs.robot,
                DocumentKind::Materials => docs.materials,
                DocumentKind::Transmissions => docs.transmissions,
                DocumentKind::Gazebo => docs
                    .gazebo
                    .context("Gazebo output is disabled for this export")?,
            };
            print!("{}", text);
        }

        Commands::InitConfig { snapshot, output } => {
            let snapshot = load_snapshot(&snapshot)?;
            ExportConfig::for_robot(snapshot.root_component_name())
                .save(&output)
                .with_context(|| format!("Failed to write config {:?}", output))?;
            println!("Wrote config to {}", output.display());
        }

        Commands::Inspect { description } => {
            let robot = read_description_file(&description)
                .with_context(|| format!("Failed to read description {:?}", description))?;

            println!(
                "{}: {} links, {} joints",
                robot.name,
                robot.links.len(),
                robot.joints.len()
            );
            for link in &robot.links {
                let [x, y, z] = link.visual_origin.xyz;
                println!(
                    "  link {}: {:.3} kg, visual at ({:.3}, {:.3}, {:.3}) cm",
                    link.name, link.mass, x, y, z
                );
            }
            for joint in &robot.joints {
                let range = joint.limits.and_then(|l| l.range());
                match range {
                    Some((lower, upper)) => println!(
                        "  joint {} ({}): {} -> {} [{}, {}]",
                        joint.name,
                        joint.joint_type.urdf_name(),
                        joint.parent,
                        joint.child,
                        lower,
                        upper
                    ),
                    None => println!(
                        "  joint {} ({}): {} -> {}",
                        joint.name,
                        joint.joint_type.urdf_name(),
                        joint.parent,
                        joint.child
                    ),
                }
            }
        }
    }

    Ok(())
}
