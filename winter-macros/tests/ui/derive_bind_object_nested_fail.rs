use winter::BindObject;

#[derive(BindObject)]
struct Order {
    #[bind(nested, email)]
    address: Address,
}

#[derive(Default, BindObject)]
struct Address {
    city: String,
}

fn main() {}
