use ddd_application::command::Command;
use ddd_macros::Command;

#[derive(Debug, Command)]
struct CloseAccount {
    id: String,
}

#[derive(Debug, Command)]
#[command(name = "account.open", output = String)]
struct OpenAccount {
    owner: String,
}

fn assert_output<C: Command<Output = O>, O>() {}

fn main() {
    let _ = CloseAccount { id: "a-1".into() }.id;
    let _ = OpenAccount { owner: "alice".into() }.owner;
    assert_output::<CloseAccount, ()>();
    assert_output::<OpenAccount, String>();
}
