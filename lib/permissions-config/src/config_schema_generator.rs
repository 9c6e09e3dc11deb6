use permissions_config::PermissionsToolConfig;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(PermissionsToolConfig);

    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Failed to serialize the configuration schema: {}", err);
            std::process::exit(1);
        }
    }
}
