use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One row-kind of the staffing schema.
///
/// The snake_case name doubles as the table name and the manifest key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Agencies,
    Profiles,
    Staff,
    Clients,
    Shifts,
    Bookings,
    Timesheets,
    Invoices,
    Payslips,
    Compliance,
    Groups,
    AdminWorkflows,
    ChangeLogs,
    OperationalCosts,
    InvoiceAmendments,
    NotificationQueue,
}

impl EntityType {
    /// Generation order: every entity only references entities listed before it.
    pub const DEPENDENCY_ORDER: [EntityType; 16] = [
        EntityType::Agencies,
        EntityType::Profiles,
        EntityType::Staff,
        EntityType::Clients,
        EntityType::Shifts,
        EntityType::Bookings,
        EntityType::Timesheets,
        EntityType::Invoices,
        EntityType::Payslips,
        EntityType::Compliance,
        EntityType::Groups,
        EntityType::AdminWorkflows,
        EntityType::ChangeLogs,
        EntityType::OperationalCosts,
        EntityType::InvoiceAmendments,
        EntityType::NotificationQueue,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            EntityType::Agencies => "agencies",
            EntityType::Profiles => "profiles",
            EntityType::Staff => "staff",
            EntityType::Clients => "clients",
            EntityType::Shifts => "shifts",
            EntityType::Bookings => "bookings",
            EntityType::Timesheets => "timesheets",
            EntityType::Invoices => "invoices",
            EntityType::Payslips => "payslips",
            EntityType::Compliance => "compliance",
            EntityType::Groups => "groups",
            EntityType::AdminWorkflows => "admin_workflows",
            EntityType::ChangeLogs => "change_logs",
            EntityType::OperationalCosts => "operational_costs",
            EntityType::InvoiceAmendments => "invoice_amendments",
            EntityType::NotificationQueue => "notification_queue",
        }
    }

    /// 1-based position in [`EntityType::DEPENDENCY_ORDER`], used in section markers.
    pub fn ordinal(self) -> usize {
        Self::DEPENDENCY_ORDER
            .iter()
            .position(|entity| *entity == self)
            .map(|pos| pos + 1)
            .unwrap_or_default()
    }

    /// Upper-case label used in section markers (`-- 5. SHIFTS (15 records)`).
    pub fn section_label(self) -> String {
        self.table_name().to_uppercase()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::DEPENDENCY_ORDER
            .iter()
            .copied()
            .find(|entity| entity.table_name() == needle)
            .ok_or_else(|| format!("unknown entity type: {s}"))
    }
}
