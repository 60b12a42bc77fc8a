use relsh::{Session, Shell, logging};

fn main() -> anyhow::Result<()> {
    logging::init();
    let session = Session::initialize()?;
    Shell::new(session).repl()
}
