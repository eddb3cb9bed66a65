//! A registration desk session: submit, get rejected, fix, delete, print.

use eventroster::{EventManager, FormController, RegistrationForm};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let dir = tempfile::tempdir()?;
    let mut manager = EventManager::builder(dir.path()).open()?;
    let mut form = FormController::new();

    let tomorrow = eventroster::local_today()
        .succ_opt()
        .ok_or("calendar overflow")?
        .to_string();

    // A bad email is rejected and the form keeps what was typed
    form.fields = RegistrationForm {
        event_name: "Rust Meetup".into(),
        event_date: tomorrow.clone(),
        organizer: "Ana".into(),
        capacity: "10".into(),
        email: "ana-at-example".into(),
    };
    if let Err(e) = form.submit(&mut manager) {
        println!("{e} -> {}", form.error_message());
    }

    form.fields.email = "ana@example.com".into();
    form.submit(&mut manager)?;
    println!("Added: Rust Meetup");

    form.fields = RegistrationForm {
        event_name: "Compiler Night".into(),
        event_date: tomorrow,
        organizer: "Bo".into(),
        capacity: "25".into(),
        email: "bo@example.com".into(),
    };
    let compiler_night = form.submit(&mut manager)?;
    println!("Added: Compiler Night");

    println!("\n{}\n", manager.view());

    manager.delete_registration(compiler_night)?;
    println!("Deleted: Compiler Night\n");

    // Reopen the same slot: the list survives the session
    drop(manager);
    let manager = EventManager::open(dir.path())?;
    println!("{}", manager.view());

    Ok(())
}
