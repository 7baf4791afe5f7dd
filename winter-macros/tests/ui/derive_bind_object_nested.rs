use winter::BindObject;

#[derive(Debug, Default, BindObject)]
struct Address {
    city: String,
    zip: u32,
}

#[derive(Debug, Default, BindObject)]
struct Order {
    #[bind(required)]
    reference: String,
    amount: f64,
    #[bind(nested)]
    shipping: Address,
    #[bind(nested, rename = "invoice")]
    billing: Address,
}

fn main() {}
