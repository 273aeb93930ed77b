//! Natural-key upserts, one per target table.

use super::upsert::{Assign, UpsertSpec};

use Assign::{Accumulate, Overwrite, Touch};

// ========== DIMENSIONS ==========

pub const PLANT: UpsertSpec = UpsertSpec {
    table: "Plant",
    columns: &[
        "Plant_Name",
        "Plant_Latitude",
        "Plant_Longitude",
        "Defaulted",
        "IsPlant",
        "IsPlanningPlant",
        "IsManufacturingPlant",
    ],
    conflict: &["Plant_Name"],
    on_conflict: &[
        ("Plant_Latitude", Overwrite),
        ("Plant_Longitude", Overwrite),
        ("Defaulted", Overwrite),
        ("IsPlant", Accumulate),
        ("IsPlanningPlant", Accumulate),
        ("IsManufacturingPlant", Accumulate),
    ],
};

/// Aggregate counters are owned by the prediction import and left untouched.
pub const MATERIAL: UpsertSpec = UpsertSpec {
    table: "Material",
    columns: &[
        "Material_A9B_Number",
        "MaterialCategory",
        "Material_Description",
        "Is_Batch_Managed",
    ],
    conflict: &["Material_A9B_Number"],
    on_conflict: &[
        ("MaterialCategory", Overwrite),
        ("Material_Description", Overwrite),
        ("Is_Batch_Managed", Overwrite),
    ],
};

pub const LOCATION: UpsertSpec = UpsertSpec {
    table: "Location",
    columns: &["Location_Name"],
    conflict: &["Location_Name"],
    on_conflict: &[],
};

// ========== FACTS ==========

pub const REPLACEMENT_PART: UpsertSpec = UpsertSpec {
    table: "ReplacementPart",
    columns: &["Material_ID", "Plant_ID", "Reason"],
    conflict: &["Material_ID", "Plant_ID"],
    on_conflict: &[("Reason", Overwrite), ("Updated_Time", Touch)],
};

pub const SERIAL_NUMBER_PROFILE: UpsertSpec = UpsertSpec {
    table: "SerialNumberProfile",
    columns: &["Material_ID", "Tracking_Number"],
    conflict: &["Material_ID"],
    on_conflict: &[("Tracking_Number", Overwrite)],
};

// ========== STAGING ==========

pub const TURBINE_DATA: UpsertSpec = UpsertSpec {
    table: "TurbineData",
    columns: &[
        "FunctionalLoc",
        "Description",
        "MaintPlant",
        "PlanningPlant",
        "Platform",
        "WTShortName",
        "TurbineModel",
        "MkVersion",
        "Revision",
        "NominalPower",
        "OriginalEqManufact",
        "SBOMForTurbine",
        "SCADAName",
        "SCADAParkID",
        "SCADACode",
        "SCADAFunctionalLoc",
        "TechID",
        "Region",
        "Technology",
        "HubHeight",
        "TowerHeight",
        "TurbineClass",
        "UnknownMaintPlant",
        "UnknownPlanningPlant",
        "TurbineLatitude",
        "TurbineLongitude",
    ],
    conflict: &["FunctionalLoc"],
    on_conflict: &[
        ("Description", Overwrite),
        ("MaintPlant", Overwrite),
        ("PlanningPlant", Overwrite),
        ("Platform", Overwrite),
        ("WTShortName", Overwrite),
        ("TurbineModel", Overwrite),
        ("MkVersion", Overwrite),
        ("Revision", Overwrite),
        ("NominalPower", Overwrite),
        ("OriginalEqManufact", Overwrite),
        ("SBOMForTurbine", Overwrite),
        ("SCADAName", Overwrite),
        ("SCADAParkID", Overwrite),
        ("SCADACode", Overwrite),
        ("SCADAFunctionalLoc", Overwrite),
        ("TechID", Overwrite),
        ("Region", Overwrite),
        ("Technology", Overwrite),
        ("HubHeight", Overwrite),
        ("TowerHeight", Overwrite),
        ("TurbineClass", Overwrite),
        ("UnknownMaintPlant", Overwrite),
        ("UnknownPlanningPlant", Overwrite),
        ("TurbineLatitude", Overwrite),
        ("TurbineLongitude", Overwrite),
    ],
};

pub const MATERIAL_DATA: UpsertSpec = UpsertSpec {
    table: "MaterialData",
    columns: &[
        "Material",
        "Plant",
        "Description",
        "PlantSpecificMaterialStatus",
        "BatchManagementPlant",
        "Serial_No_Profile",
        "ReplacementPart",
        "UsedInSBom",
        "ViolationReplacementPart",
        "MaterialCategory",
        "UnknownPlant",
        "Auto_Classified",
        "Timestamp",
    ],
    conflict: &["Material", "Plant"],
    on_conflict: &[
        ("Description", Overwrite),
        ("PlantSpecificMaterialStatus", Overwrite),
        ("BatchManagementPlant", Overwrite),
        ("Serial_No_Profile", Overwrite),
        ("ReplacementPart", Overwrite),
        ("UsedInSBom", Overwrite),
        ("ViolationReplacementPart", Overwrite),
        ("MaterialCategory", Overwrite),
        ("UnknownPlant", Overwrite),
        ("Auto_Classified", Overwrite),
        ("Timestamp", Overwrite),
    ],
};

// ========== PREDICTIONS ==========

pub const PREDICTION_GLOBAL: UpsertSpec = UpsertSpec {
    table: "ReplacementPredictionGlobal",
    columns: &[
        "Material_ID",
        "Material_Description",
        "MaterialCategory",
        "Total_Count",
        "Count_B",
        "BayesianProbability",
        "MonteCarloProbability",
        "MonteCarlo_5thPercentile",
        "MonteCarlo_95thPercentile",
        "MonteCarlo_StdDev",
    ],
    conflict: &["Material_ID", "MaterialCategory"],
    on_conflict: &[
        ("Material_Description", Overwrite),
        ("Total_Count", Overwrite),
        ("Count_B", Overwrite),
        ("BayesianProbability", Overwrite),
        ("MonteCarloProbability", Overwrite),
        ("MonteCarlo_5thPercentile", Overwrite),
        ("MonteCarlo_95thPercentile", Overwrite),
        ("MonteCarlo_StdDev", Overwrite),
        ("Timestamp", Touch),
    ],
};

pub const PREDICTION_BY_PLANT: UpsertSpec = UpsertSpec {
    table: "ReplacementPrediction",
    columns: &[
        "Material_ID",
        "Plant_ID",
        "Material_Description",
        "MaterialCategory",
        "Total_Count",
        "Count_B",
        "BayesianProbability",
        "MonteCarloProbability",
        "MonteCarlo_5thPercentile",
        "MonteCarlo_95thPercentile",
        "MonteCarlo_StdDev",
    ],
    conflict: &["Material_ID", "Plant_ID", "MaterialCategory"],
    on_conflict: &[
        ("Material_Description", Overwrite),
        ("Total_Count", Overwrite),
        ("Count_B", Overwrite),
        ("BayesianProbability", Overwrite),
        ("MonteCarloProbability", Overwrite),
        ("MonteCarlo_5thPercentile", Overwrite),
        ("MonteCarlo_95thPercentile", Overwrite),
        ("MonteCarlo_StdDev", Overwrite),
        ("Timestamp", Touch),
    ],
};

pub const DOMINANCE: UpsertSpec = UpsertSpec {
    table: "MonteCarloDominance",
    columns: &["Description", "DominanceCount", "Percentage"],
    conflict: &["Description"],
    on_conflict: &[
        ("DominanceCount", Overwrite),
        ("Percentage", Overwrite),
        ("Timestamp", Touch),
    ],
};

pub const TRENDS: UpsertSpec = UpsertSpec {
    table: "ReplacementTrends",
    columns: &["Timestamp", "Description", "Count", "Prediction_ID"],
    conflict: &["Timestamp", "Description"],
    on_conflict: &[("Count", Overwrite), ("Prediction_ID", Overwrite)],
};

pub const CATEGORY_PREDICTIONS: UpsertSpec = UpsertSpec {
    table: "MaterialCategoryPredictions",
    columns: &[
        "Category",
        "BayesianProbability",
        "MonteCarloEstimate",
        "MonteCarlo_5th_Percentile",
        "MonteCarlo_50th_Percentile",
        "MonteCarlo_95th_Percentile",
    ],
    conflict: &["Category"],
    on_conflict: &[
        ("BayesianProbability", Overwrite),
        ("MonteCarloEstimate", Overwrite),
        ("MonteCarlo_5th_Percentile", Overwrite),
        ("MonteCarlo_50th_Percentile", Overwrite),
        ("MonteCarlo_95th_Percentile", Overwrite),
        ("Timestamp", Touch),
    ],
};

pub const FORECASTS: UpsertSpec = UpsertSpec {
    table: "MaintenanceForecasts",
    columns: &[
        "Material_ID",
        "Plant_ID",
        "LastMaintenance",
        "AverageIntervalDays",
        "NextEstimatedMaintenanceDate",
    ],
    conflict: &["Material_ID", "Plant_ID"],
    on_conflict: &[
        ("LastMaintenance", Overwrite),
        ("AverageIntervalDays", Overwrite),
        ("NextEstimatedMaintenanceDate", Overwrite),
        ("Timestamp", Touch),
    ],
};

pub const TRANSITIONS: UpsertSpec = UpsertSpec {
    table: "MaterialStatusTransitions",
    columns: &[
        "Material",
        "Description",
        "PrevStatus",
        "Plant",
        "PlantSpecificMaterialStatus",
        "TransitionCount",
        "Direction",
    ],
    conflict: &["Material", "PrevStatus", "Plant", "PlantSpecificMaterialStatus"],
    on_conflict: &[
        ("Description", Overwrite),
        ("TransitionCount", Overwrite),
        ("Direction", Overwrite),
        ("Timestamp", Touch),
    ],
};

// ========== HEALTH SCORES ==========

pub const CATEGORY_HEALTH: UpsertSpec = UpsertSpec {
    table: "MaterialCategoryHealthScores",
    columns: &["Category", "Plant", "HealthScore", "LastUpdated"],
    conflict: &["Category", "Plant"],
    on_conflict: &[("HealthScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const CATEGORY_SUMMARY: UpsertSpec = UpsertSpec {
    table: "MaterialCategoryScoreSummary",
    columns: &["Category", "TotalCategoryScore", "LastUpdated"],
    conflict: &["Category"],
    on_conflict: &[("TotalCategoryScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const COMPONENT_HEALTH: UpsertSpec = UpsertSpec {
    table: "MaterialComponentHealthScore",
    columns: &["Material_ID", "Plant", "HealthScore", "LastUpdated"],
    conflict: &["Material_ID", "Plant"],
    on_conflict: &[("HealthScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const COMPONENT_SUMMARY: UpsertSpec = UpsertSpec {
    table: "MaterialComponentScoreSummary",
    columns: &["Material_ID", "TotalComponentScore", "LastUpdated"],
    conflict: &["Material_ID"],
    on_conflict: &[("TotalComponentScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const MODEL_HEALTH: UpsertSpec = UpsertSpec {
    table: "TurbineModelHealthScore",
    columns: &["TurbineModel", "Plant", "HealthScore", "LastUpdated"],
    conflict: &["TurbineModel", "Plant"],
    on_conflict: &[("HealthScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const MODEL_SUMMARY: UpsertSpec = UpsertSpec {
    table: "TurbineModelScoreSummary",
    columns: &["TurbineModel", "TotalModelScore", "LastUpdated"],
    conflict: &["TurbineModel"],
    on_conflict: &[("TotalModelScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const PLATFORM_HEALTH: UpsertSpec = UpsertSpec {
    table: "TurbinePlatformHealthScore",
    columns: &["Platform", "Plant", "HealthScore", "LastUpdated"],
    conflict: &["Platform", "Plant"],
    on_conflict: &[("HealthScore", Overwrite), ("LastUpdated", Overwrite)],
};

pub const PLATFORM_SUMMARY: UpsertSpec = UpsertSpec {
    table: "TurbinePlatformScoreSummary",
    columns: &["Platform", "TotalPlatformScore", "LastUpdated"],
    conflict: &["Platform"],
    on_conflict: &[("TotalPlatformScore", Overwrite), ("LastUpdated", Overwrite)],
};
