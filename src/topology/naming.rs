//! Name tags and logical ids for derived resources.

/// Role a resource plays in the topology; list roles carry their 0-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Vpc,
    PublicSubnet(usize),
    PrivateSubnet(usize),
    InternetGateway,
    GatewayAttachment,
    PublicRouteTable,
    PublicRoute,
    PublicAssociation(usize),
    PrivateRouteTable(usize),
    PrivateAssociation(usize),
}

impl Role {
    /// Suffix of the `Name` tag, or None for roles that carry no tag.
    fn name_suffix(&self) -> Option<String> {
        match self {
            Role::Vpc => Some("vpc".to_string()),
            Role::PublicSubnet(i) => Some(format!("public-subnet-{}", i + 1)),
            Role::PrivateSubnet(i) => Some(format!("private-subnet-{}", i + 1)),
            Role::InternetGateway => Some("igw".to_string()),
            Role::PublicRouteTable => Some("public-rt".to_string()),
            Role::PrivateRouteTable(i) => Some(format!("private-rt-{}", i + 1)),
            Role::GatewayAttachment
            | Role::PublicRoute
            | Role::PublicAssociation(_)
            | Role::PrivateAssociation(_) => None,
        }
    }

    /// Logical id, stable across builds and unique within one construct.
    pub fn logical_id(&self) -> String {
        match self {
            Role::Vpc => "StandardVPC".to_string(),
            Role::PublicSubnet(i) => format!("PublicSubnet{}", i + 1),
            Role::PrivateSubnet(i) => format!("PrivateSubnet{}", i + 1),
            Role::InternetGateway => "InternetGateway".to_string(),
            Role::GatewayAttachment => "IGWAttachment".to_string(),
            Role::PublicRouteTable => "PublicRouteTable".to_string(),
            Role::PublicRoute => "PublicRoute".to_string(),
            Role::PublicAssociation(i) => format!("PublicSubnetRouteTableAssociation{}", i + 1),
            Role::PrivateRouteTable(i) => format!("PrivateRouteTable{}", i + 1),
            Role::PrivateAssociation(i) => format!("PrivateSubnetRouteTableAssociation{}", i + 1),
        }
    }
}

/// `{project}-{region}-{suffix}`, e.g. `demo-eu-west-1-public-subnet-2`.
///
/// Roles without a name tag fall back to their logical id as suffix.
pub fn resource_name(project: &str, region: &str, role: Role) -> String {
    let suffix = role.name_suffix().unwrap_or_else(|| role.logical_id());
    format!("{project}-{region}-{suffix}")
}

/// Graph id of a resource: `{construct_id}/{logical_id}`.
pub fn resource_id(construct_id: &str, role: Role) -> String {
    format!("{construct_id}/{}", role.logical_id())
}
