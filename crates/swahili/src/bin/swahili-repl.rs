use std::io::{self, BufRead as _, Write as _};

use swahili::{Object, ReplSession, StdConsole};

fn main() {
    let mut session = ReplSession::new("<stdin>");
    let mut console = StdConsole;
    loop {
        print!("swahili > ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match session.execute(line, &mut console) {
            // andika already printed; don't echo the tupu it returned
            Ok(Object::Null) => {}
            Ok(value) => println!("{value}"),
            Err(error) => eprintln!("{error}"),
        }
    }
}
