use anyhow::*;
use cammie::camera::*;
use cammie::jmp::*;
use cammie::placement::ObjectPlacement;
use log::*;
use structopt::StructOpt;

use std::fs;
use std::path::PathBuf;

mod descriptor;

#[derive(Debug, StructOpt)]
#[structopt(name = "cammie", about = "inspects camera animations and placement tables")]
struct Opt {
    #[structopt(short, long, parse(from_os_str), default_value = "cammie.toml")]
    config: PathBuf,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Dumps a camera animation's header and keyframes
    Camera {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },
    /// Prints the interpolated camera pose at a frame
    Sample {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        frame: f32,
        #[structopt(long)]
        hermite: bool,
    },
    /// Dumps the records of a JMP/BCSV table
    Table {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
        /// Field names are hashed the BCSV way
        #[structopt(long)]
        bcsv: bool,
        /// Prints object placements instead of raw columns
        #[structopt(long)]
        objects: bool,
    },
}

fn dump_camera(anim: &CameraAnimation) {
    println!(
        "{} {:?}, end frame {}",
        String::from_utf8_lossy(&anim.magic),
        anim.kind,
        anim.end_frame
    );
    for (name, track) in anim.tracks() {
        println!("{:?}: {} key(s), {:?}", name, track.len(), track.format());
        for kf in track.keyframes() {
            println!(
                "  {:>6} {:>12.4} in {:>9.4} out {:>9.4}",
                kf.frame, kf.value, kf.in_slope, kf.out_slope
            );
        }
    }
}

fn cell(table: &Table, entry: usize, name: &str) -> String {
    let field = match table.field(name) {
        Some(f) => f,
        None => return "-".into(),
    };
    match field.ty {
        FieldType::String => table.get_string(entry, name),
        FieldType::Float => table.get_float(entry, name).to_string(),
        FieldType::Integer | FieldType::Other(_) => table.get_unsigned_int(entry, name).to_string(),
    }
}

fn dump_table(table: &Table, columns: &[String]) {
    for field in table.fields() {
        let name = known_field_name(field.hash, table.scheme()).unwrap_or("?");
        println!(
            "field {:#010x} {:<16} {:?} at {:#x} mask {:#010x} >> {}",
            field.hash, name, field.ty, field.start, field.bitmask, field.shift
        );
    }
    println!("{}", columns.join("\t"));
    for entry in 0..table.entry_count() {
        let row: Vec<_> = columns.iter().map(|c| cell(table, entry, c)).collect();
        println!("{}", row.join("\t"));
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let opt = Opt::from_args();
    let config = descriptor::Config::load(&opt.config);
    debug!("{:?}", config);

    match opt.cmd {
        Command::Camera { input } => {
            let data = fs::read(&input).context("failed to open camera animation")?;
            let anim = CameraAnimation::from_bytes(&data).context("failed to parse camera animation")?;
            dump_camera(&anim);
        }
        Command::Sample { input, frame, hermite } => {
            let data = fs::read(&input).context("failed to open camera animation")?;
            let anim = CameraAnimation::from_bytes(&data).context("failed to parse camera animation")?;
            if frame > anim.end_frame as f32 {
                warn!("frame {} is past the end frame {}", frame, anim.end_frame);
            }
            let pose = anim.sample(frame, hermite || config.hermite);
            println!("eye    {:?}", pose.eye);
            println!("target {:?}", pose.target);
            println!("twist  {}", pose.twist);
            println!("fov y  {}", pose.fov_y);
        }
        Command::Table { input, bcsv, objects } => {
            let data = fs::read(&input).context("failed to open table")?;
            let scheme = if bcsv { NameHash::Bcsv } else { NameHash::Jmp };
            let table = Table::from_bytes_with(&data, scheme).context("failed to parse table")?;
            info!("{} entr(ies)", table.entry_count());
            if objects {
                for object in ObjectPlacement::from_table(&table) {
                    println!("{:<24} {:?} {:?}", object.name, object.position, object.rotation);
                }
            } else {
                dump_table(&table, &config.fields);
            }
        }
    }
    Ok(())
}
