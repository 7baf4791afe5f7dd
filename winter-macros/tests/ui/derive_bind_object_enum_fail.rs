use winter::BindObject;

#[derive(BindObject)]
enum Choice {
    Yes,
    No,
}

fn main() {}
