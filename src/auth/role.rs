use strum::{AsRefStr, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumIter)]
pub enum Role {
    #[strum(serialize = "buyer")]
    Buyer,
    #[strum(serialize = "seller")]
    Seller,
    #[strum(serialize = "admin")]
    Admin,
}
