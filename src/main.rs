use std::{env, fs::File, process};

use methodtable_class_file::{read_method_positions, ClassFileError};

fn main() {
    pretty_env_logger::init();

    let mut failed = false;
    for path in env::args().skip(1) {
        let result = File::open(&path)
            .map_err(ClassFileError::from)
            .and_then(read_method_positions);
        let positions = match result {
            Ok(positions) => positions,
            Err(e) => {
                log::error!("{}: {}", path, e);
                failed = true;
                continue;
            }
        };

        let mut methods = positions.iter().collect::<Vec<_>>();
        methods.sort_by(|(a, a_position), (b, b_position)| {
            (a_position.order, a).cmp(&(b_position.order, b))
        });

        println!("{}:", path);
        for (signature, position) in methods {
            if position.has_position {
                println!("    {:>5}  {}", position.min_line, signature);
            } else {
                println!("    {:>5}  {}", "-", signature);
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
