use std::error::Error;

use hyperion::{Backend, BackendError, ProcessBackend, Program, ProjectConfig};

// Example programs fed through the compiler as-is
const FIXTURES: [(&str, &str); 4] = [
    (
        "always_succeeds",
        r#"spending always_succeeds

func main(_, _, _) -> Bool {
    true
}"#,
    ),
    (
        "time_lock",
        r#"spending time_lock

struct Datum {
    lockUntil:   Time
    owner:       PubKeyHash
    beneficiary: PubKeyHash
}

func main(datum: Datum, _, context: ScriptContext) -> Bool {
    tx: Tx = context.tx;
    now: Time = tx.time_range.start;

    if (tx.is_signed_by(datum.owner)) {
        true
    } else {
        tx.is_signed_by(datum.beneficiary) && now > datum.lockUntil
    }
}"#,
    ),
    (
        "signed_mint",
        r#"minting signed_mint

const OWNER: PubKeyHash = PubKeyHash::new(#)

func main(_, context: ScriptContext) -> Bool {
    context.tx.is_signed_by(OWNER)
}"#,
    ),
    (
        "broken",
        r#"spending broken

func main(_, _, _) -> Bool {
    1 +
}"#,
    ),
];

fn main() -> Result<(), Box<dyn Error>> {
    let config = ProjectConfig::resolve(None)?;
    let backend = ProcessBackend::new(config.compiler_command());

    for (label, source) in FIXTURES {
        println!("Compiling {}...", label);

        let result = backend.load(source).and_then(|program| program.compile(true));
        match result {
            Ok(compiled) => {
                println!("name: {}", compiled.name);
                println!("{}", compiled.serialized);
            }
            Err(BackendError::User(err)) => println!("rejected: {}", err),
            Err(err) => return Err(err.into()),
        }

        println!("\n-----------------------------------\n");
    }

    Ok(())
}
