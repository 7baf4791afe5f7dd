use winter::BindObject;

#[derive(BindObject)]
struct Pair(String, u32);

fn main() {}
