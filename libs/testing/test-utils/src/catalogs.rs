//! Ready-made offer files for every service the engine parses.
//!
//! Rates follow us-east-1 public pricing. Each catalog also carries the
//! near-duplicate variants (reserved capacity, BYOL, Multi-AZ, IA, Outposts)
//! that a parser has to skip.

use crate::CatalogBuilder;

pub const REGION: &str = "us-east-1";

const IN_REGION: (&str, &str) = ("locationType", "AWS Region");
const REGION_CODE: (&str, &str) = ("regionCode", REGION);

fn ec2_instance(builder: CatalogBuilder, instance_type: &str, os: &str, capacity: &str, usd: &str) -> CatalogBuilder {
    builder.product(
        "Compute Instance",
        &[
            ("instanceType", instance_type),
            ("operatingSystem", os),
            ("tenancy", "Shared"),
            ("capacitystatus", capacity),
            ("preInstalledSw", "NA"),
            ("licenseModel", "No License required"),
            IN_REGION,
            REGION_CODE,
        ],
        "Hrs",
        usd,
    )
}

/// EC2 instances only (compute parser input)
pub fn ec2_compute() -> CatalogBuilder {
    let mut builder = CatalogBuilder::new("AmazonEC2");
    for (instance_type, usd) in [("t3.micro", "0.0104"), ("t3.medium", "0.0416"), ("m5.large", "0.0960")] {
        builder = ec2_instance(builder, instance_type, "Linux", "Used", usd);
        builder = ec2_instance(builder, instance_type, "Linux", "AllocatedCapacityReservation", "0.0000");
        builder = ec2_instance(builder, instance_type, "Linux", "UnusedCapacityReservation", usd);
    }
    builder = ec2_instance(builder, "t3.micro", "Windows", "Used", "0.0196");

    builder
        .product(
            "Compute Instance",
            &[
                ("instanceType", "t3.micro"),
                ("operatingSystem", "Linux"),
                ("tenancy", "Shared"),
                ("capacitystatus", "Used"),
                ("preInstalledSw", "SQL Web"),
                ("licenseModel", "No License required"),
                IN_REGION,
                REGION_CODE,
            ],
            "Hrs",
            "0.0300",
        )
        .product(
            "Compute Instance",
            &[
                ("instanceType", "m5.large"),
                ("operatingSystem", "Linux"),
                ("tenancy", "Dedicated"),
                ("capacitystatus", "Used"),
                ("preInstalledSw", "NA"),
                ("licenseModel", "No License required"),
                IN_REGION,
                REGION_CODE,
            ],
            "Hrs",
            "0.1060",
        )
        .product(
            "NAT Gateway",
            &[("usagetype", "NatGateway-Hours"), ("group", "NGW:NatGateway"), IN_REGION, REGION_CODE],
            "Hrs",
            "0.045",
        )
        .product(
            "NAT Gateway",
            &[("usagetype", "NatGateway-Bytes"), ("group", "NGW:NatGateway"), IN_REGION, REGION_CODE],
            "GB",
            "0.045",
        )
        .product(
            "IP Address",
            &[("usagetype", "USE1-PublicIPv4:InUseAddress"), IN_REGION, REGION_CODE],
            "Hrs",
            "0.005",
        )
}

/// EBS volumes, IOPS, throughput and snapshots (storage parser input)
pub fn ec2_storage() -> CatalogBuilder {
    let mut builder = CatalogBuilder::new("AmazonEC2");
    for (api, usd) in [("gp2", "0.10"), ("gp3", "0.08"), ("io1", "0.125"), ("io2", "0.125"), ("st1", "0.045"), ("sc1", "0.015"), ("standard", "0.05")] {
        let usage = format!("EBS:VolumeUsage.{api}");
        builder = builder.product(
            "Storage",
            &[("volumeApiName", api), ("usagetype", usage.as_str()), IN_REGION, REGION_CODE],
            "GB-Mo",
            usd,
        );
    }

    builder
        .product(
            "Storage",
            &[("volumeApiName", "gp3"), ("usagetype", "EBS:VolumeUsage.gp3"), ("locationType", "AWS Outposts"), REGION_CODE],
            "GB-Mo",
            "0.30",
        )
        .product(
            "System Operation",
            &[("volumeApiName", "io1"), ("group", "EBS IOPS"), ("usagetype", "EBS:VolumeP-IOPS.piops"), IN_REGION, REGION_CODE],
            "IOPS-Mo",
            "0.065",
        )
        .product(
            "System Operation",
            &[("volumeApiName", "gp3"), ("group", "EBS IOPS"), ("usagetype", "EBS:VolumeP-IOPS.gp3"), IN_REGION, REGION_CODE],
            "IOPS-Mo",
            "0.005",
        )
        .product(
            "System Operation",
            &[("volumeApiName", "io2"), ("group", "EBS IOPS Tier 2"), ("usagetype", "EBS:VolumeP-IOPS.io2.tier2"), IN_REGION, REGION_CODE],
            "IOPS-Mo",
            "0.0455",
        )
        .product(
            "Provisioned Throughput",
            &[("volumeApiName", "gp3"), ("group", "EBS Throughput"), ("usagetype", "EBS:VolumeP-Throughput.gp3"), IN_REGION, REGION_CODE],
            "GiBps-mo",
            "0.04",
        )
        .product(
            "Storage Snapshot",
            &[("usagetype", "EBS:SnapshotUsage"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.05",
        )
        .product(
            "Storage Snapshot",
            &[("usagetype", "EBS:SnapshotArchiveStorage"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.0125",
        )
}

fn rds_instance(builder: CatalogBuilder, class: &str, engine: &str, deployment: &str, license: &str, usd: &str) -> CatalogBuilder {
    builder.product(
        "Database Instance",
        &[
            ("instanceType", class),
            ("databaseEngine", engine),
            ("deploymentOption", deployment),
            ("licenseModel", license),
            IN_REGION,
            REGION_CODE,
        ],
        "Hrs",
        usd,
    )
}

pub fn rds() -> CatalogBuilder {
    let mut builder = CatalogBuilder::new("AmazonRDS");
    builder = rds_instance(builder, "db.t3.micro", "PostgreSQL", "Single-AZ", "No license required", "0.018");
    builder = rds_instance(builder, "db.t3.micro", "PostgreSQL", "Multi-AZ", "No license required", "0.036");
    builder = rds_instance(builder, "db.t3.micro", "MySQL", "Single-AZ", "No license required", "0.017");
    builder = rds_instance(builder, "db.m5.large", "MySQL", "Single-AZ", "No license required", "0.171");
    builder = rds_instance(builder, "db.m5.large", "Oracle", "Single-AZ", "Bring your own license", "0.171");
    builder = rds_instance(builder, "db.m5.large", "Oracle", "Single-AZ", "License included", "0.340");
    builder = rds_instance(builder, "db.r6g.large", "Aurora PostgreSQL", "Single-AZ", "No license required", "0.260");

    builder
        .product(
            "Database Instance",
            &[
                ("instanceType", "db.r6g.large"),
                ("databaseEngine", "Aurora PostgreSQL"),
                ("deploymentOption", "Single-AZ"),
                ("licenseModel", "No license required"),
                ("storage", "Aurora IO Optimization Mode"),
                IN_REGION,
                REGION_CODE,
            ],
            "Hrs",
            "0.338",
        )
        .product(
            "Database Storage",
            &[("volumeType", "General Purpose"), ("deploymentOption", "Single-AZ"), ("databaseEngine", "Any"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.115",
        )
        .product(
            "Database Storage",
            &[("volumeType", "General Purpose-GP3"), ("deploymentOption", "Single-AZ"), ("databaseEngine", "Any"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.115",
        )
        .product(
            "Database Storage",
            &[("volumeType", "General Purpose"), ("deploymentOption", "Multi-AZ"), ("databaseEngine", "Any"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.230",
        )
        .product(
            "Database Storage",
            &[("volumeType", "Provisioned IOPS"), ("deploymentOption", "Single-AZ"), ("databaseEngine", "Any"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.125",
        )
        .product(
            "Provisioned IOPS",
            &[("volumeType", "Provisioned IOPS"), ("deploymentOption", "Single-AZ"), ("databaseEngine", "Any"), IN_REGION, REGION_CODE],
            "IOPS-Mo",
            "0.10",
        )
}

pub fn eks() -> CatalogBuilder {
    CatalogBuilder::new("AmazonEKS")
        .product(
            "Compute",
            &[("usagetype", "USE1-AmazonEKS-Hours:perCluster"), IN_REGION, REGION_CODE],
            "Hours",
            "0.10",
        )
        .product(
            "Compute",
            &[("usagetype", "USE1-AmazonEKS-Hours:extendedSupport"), IN_REGION, REGION_CODE],
            "Hours",
            "0.60",
        )
        .product(
            "Compute",
            &[("usagetype", "USE1-Fargate-vCPU-Hours:perCPU"), IN_REGION, REGION_CODE],
            "hours",
            "0.04048",
        )
        .product(
            "Compute",
            &[("usagetype", "USE1-Fargate-ARM-vCPU-Hours:perCPU"), IN_REGION, REGION_CODE],
            "hours",
            "0.03238",
        )
        .product(
            "Compute",
            &[("usagetype", "USE1-Fargate-GB-Hours"), IN_REGION, REGION_CODE],
            "hours",
            "0.004445",
        )
}

const LAMBDA_X86_DURATION: [(&str, &str, &str); 3] = [
    ("0", "6000000000", "0.0000166667"),
    ("6000000000", "15000000000", "0.0000150000"),
    ("15000000000", "Inf", "0.0000133334"),
];

/// Lambda with both architectures priced
pub fn lambda() -> CatalogBuilder {
    lambda_x86_only().tiered_product(
        "Serverless",
        &[("group", "AWS-Lambda-Duration-ARM"), IN_REGION, REGION_CODE],
        "Lambda-GB-Second",
        &[
            ("0", "7500000000", "0.0000133334"),
            ("7500000000", "18750000000", "0.0000120001"),
            ("18750000000", "Inf", "0.0000106667"),
        ],
    )
    .product(
        "Serverless",
        &[("group", "AWS-Lambda-Requests-ARM"), IN_REGION, REGION_CODE],
        "Requests",
        "0.0000002",
    )
}

/// Lambda with only the x86_64 baseline priced
pub fn lambda_x86_only() -> CatalogBuilder {
    CatalogBuilder::new("AWSLambda")
        .tiered_product(
            "Serverless",
            &[("group", "AWS-Lambda-Duration"), IN_REGION, REGION_CODE],
            "Lambda-GB-Second",
            &LAMBDA_X86_DURATION,
        )
        .product(
            "Serverless",
            &[("group", "AWS-Lambda-Requests"), IN_REGION, REGION_CODE],
            "Requests",
            "0.0000002",
        )
        .product(
            "Serverless",
            &[("group", "AWS-Lambda-Storage-Duration"), IN_REGION, REGION_CODE],
            "GB-Seconds",
            "0.0000000309",
        )
        .product(
            "Serverless",
            &[("group", "AWS-Lambda-Duration-Provisioned"), IN_REGION, REGION_CODE],
            "Lambda-GB-Second",
            "0.0000041667",
        )
}

pub fn dynamodb() -> CatalogBuilder {
    CatalogBuilder::new("AmazonDynamoDB")
        .product(
            "Amazon DynamoDB PayPerRequest Throughput",
            &[("group", "DDB-ReadUnits"), ("usagetype", "ReadRequestUnits"), IN_REGION, REGION_CODE],
            "ReadRequestUnits",
            "0.000000125",
        )
        .product(
            "Amazon DynamoDB PayPerRequest Throughput",
            &[("group", "DDB-WriteUnits"), ("usagetype", "WriteRequestUnits"), IN_REGION, REGION_CODE],
            "WriteRequestUnits",
            "0.000000625",
        )
        .product(
            "Amazon DynamoDB PayPerRequest Throughput",
            &[("group", "DDB-ReadUnits"), ("usagetype", "IA-ReadRequestUnits"), IN_REGION, REGION_CODE],
            "ReadRequestUnits",
            "0.000000155",
        )
        .tiered_product(
            "Provisioned IOPS",
            &[("group", "DDB-ReadUnits"), ("usagetype", "ReadCapacityUnit-Hrs"), IN_REGION, REGION_CODE],
            "ReadCapacityUnit-Hrs",
            &[("0", "25", "0.0000000000"), ("25", "Inf", "0.00013")],
        )
        .tiered_product(
            "Provisioned IOPS",
            &[("group", "DDB-WriteUnits"), ("usagetype", "WriteCapacityUnit-Hrs"), IN_REGION, REGION_CODE],
            "WriteCapacityUnit-Hrs",
            &[("0", "25", "0.0000000000"), ("25", "Inf", "0.00065")],
        )
        .tiered_product(
            "Database Storage",
            &[("volumeType", "Amazon DynamoDB - Indexed DataStore"), ("usagetype", "TimedStorage-ByteHrs"), IN_REGION, REGION_CODE],
            "GB-Mo",
            &[("0", "25", "0.0000000000"), ("25", "Inf", "0.25")],
        )
        .product(
            "Database Storage",
            &[("volumeType", "Amazon DynamoDB - Indexed DataStore - IA"), ("usagetype", "IA-TimedStorage-ByteHrs"), IN_REGION, REGION_CODE],
            "GB-Mo",
            "0.10",
        )
}

pub fn elb() -> CatalogBuilder {
    CatalogBuilder::new("AWSELB")
        .product("Load Balancer-Application", &[("usagetype", "LoadBalancerUsage"), IN_REGION, REGION_CODE], "Hrs", "0.0225")
        .product("Load Balancer-Application", &[("usagetype", "LCUUsage"), IN_REGION, REGION_CODE], "LCU-Hrs", "0.008")
        .product("Load Balancer-Network", &[("usagetype", "LoadBalancerUsage"), IN_REGION, REGION_CODE], "Hrs", "0.0225")
        .product("Load Balancer-Network", &[("usagetype", "NLCUUsage"), IN_REGION, REGION_CODE], "NLCU-Hrs", "0.006")
        .product("Load Balancer-Gateway", &[("usagetype", "GatewayLoadBalancerUsage"), IN_REGION, REGION_CODE], "Hrs", "0.0125")
        .product("Load Balancer-Gateway", &[("usagetype", "GLCUUsage"), IN_REGION, REGION_CODE], "GLCU-Hrs", "0.004")
        .product("Load Balancer", &[("usagetype", "LoadBalancerUsage"), IN_REGION, REGION_CODE], "Hrs", "0.025")
        .product("Load Balancer", &[("usagetype", "DataProcessing-Bytes"), IN_REGION, REGION_CODE], "GB", "0.008")
        .product(
            "Load Balancer-Application",
            &[("usagetype", "LoadBalancerUsage"), ("locationType", "AWS Outposts"), REGION_CODE],
            "Hrs",
            "0.0400",
        )
}

pub fn api_gateway() -> CatalogBuilder {
    CatalogBuilder::new("AmazonApiGateway")
        .tiered_product(
            "API Calls",
            &[("operation", "ApiGatewayRequest"), IN_REGION, REGION_CODE],
            "Requests",
            &[
                ("0", "333000000", "0.0000035000"),
                ("333000000", "1000000000", "0.0000028000"),
                ("1000000000", "20000000000", "0.0000023800"),
                ("20000000000", "Inf", "0.0000015100"),
            ],
        )
        .tiered_product(
            "API Calls",
            &[("operation", "ApiGatewayHttpApi"), IN_REGION, REGION_CODE],
            "Requests",
            &[("0", "300000000", "0.0000010000"), ("300000000", "Inf", "0.0000009000")],
        )
        .tiered_product(
            "WebSocket",
            &[("operation", "ApiGatewayWebSocket"), IN_REGION, REGION_CODE],
            "Messages",
            &[("0", "1000000000", "0.0000010000"), ("1000000000", "Inf", "0.0000008000")],
        )
        .product(
            "WebSocket",
            &[("operation", "ApiGatewayMinute"), IN_REGION, REGION_CODE],
            "Minutes",
            "0.00000025",
        )
        .product(
            "Amazon API Gateway Cache",
            &[("cacheMemorySizeGb", "0.5"), IN_REGION, REGION_CODE],
            "Hrs",
            "0.02",
        )
}

/// Every catalog keyed by the engine's service names
pub fn all() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("compute", ec2_compute().to_bytes()),
        ("storage", ec2_storage().to_bytes()),
        ("managed_database", rds().to_bytes()),
        ("managed_cluster", eks().to_bytes()),
        ("function_compute", lambda().to_bytes()),
        ("table_store", dynamodb().to_bytes()),
        ("load_balancer", elb().to_bytes()),
        ("gateway", api_gateway().to_bytes()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_catalogs_are_valid_json() {
        for (service, bytes) in all() {
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(value["products"].is_object(), "{service} has products");
        }
    }
}
