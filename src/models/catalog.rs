pub const APPROVED_RESORTS: [&str; 5] = [
    "Arcadia Beach Resort",
    "Kuya Boy Beach Resort",
    "Blue Horizon Resort",
    "White Sand Paradise",
    "Mountain View Villa",
];

pub const APPROVED_PAYMENT_GATEWAYS: [&str; 7] = [
    "Credit Card",
    "GCash",
    "PayPal",
    "Bank Transfer",
    "BANCO DE ORO",
    "Metrobank",
    "BDO",
];

pub fn is_approved_resort(name: &str) -> bool {
    APPROVED_RESORTS.contains(&name)
}

pub fn is_approved_payment_gateway(name: &str) -> bool {
    APPROVED_PAYMENT_GATEWAYS.contains(&name)
}
