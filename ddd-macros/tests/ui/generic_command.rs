use ddd_macros::Command;
use std::fmt::Debug;

#[derive(Debug, Command)]
#[command(output = Option<T>)]
struct Lookup<T: Debug + Send + Sync + 'static> {
    key: String,
    _marker: std::marker::PhantomData<T>,
}

fn main() {
    let _ = Lookup::<u32> {
        key: "k".into(),
        _marker: std::marker::PhantomData,
    }
    .key;
}
