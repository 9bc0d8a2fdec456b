//! Deploys a devnet setup of both wrappers and inspects it.

use odra::casper_types::U256;
use odra::host::HostEnv;
use odra::prelude::Addressable;

use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

use token_wrappers::elastic_wrapper::{ElasticWrapper, ElasticWrapperInitArgs};
use token_wrappers::mocks::{MockToken, MockTokenInitArgs};
use token_wrappers::oracle::{ManualPriceOracle, ManualPriceOracleInitArgs};
use token_wrappers::share_wrapper::{ShareWrapper, ShareWrapperInitArgs, INITIAL_DEPOSIT};

const DEPLOY_GAS: u64 = 350_000_000_000;
const CALL_GAS: u64 = 5_000_000_000;

/// Price precision of the devnet feed.
const PRICE_DECIMALS: u8 = 8;
/// Feed goes stale after one day.
const MAX_PRICE_AGE: u64 = 86_400_000;

fn devnet_price() -> U256 {
    U256::from(2_000u64) * U256::exp10(PRICE_DECIMALS as usize)
}

/// Deploys the mock asset, the oracle and both wrappers, then locks the
/// share wrapper's initial deposit.
pub struct WrappersDeployScript;

impl DeployScript for WrappersDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        let caller = env.caller();

        let mut token = MockToken::load_or_deploy(
            env,
            MockTokenInitArgs {
                name: "Devnet Ether".to_string(),
                symbol: "dETH".to_string(),
                decimals: 18,
            },
            container,
            DEPLOY_GAS,
        )?;
        log::info!("MockToken at {:?}", token.address());

        let mut oracle = ManualPriceOracle::load_or_deploy(
            env,
            ManualPriceOracleInitArgs {
                price_decimals: PRICE_DECIMALS,
                max_age: MAX_PRICE_AGE,
            },
            container,
            DEPLOY_GAS,
        )?;
        env.set_gas(CALL_GAS);
        oracle.publish_price(devnet_price());
        log::info!("ManualPriceOracle at {:?}", oracle.address());

        let elastic = ElasticWrapper::load_or_deploy(
            env,
            ElasticWrapperInitArgs {
                underlying: token.address().clone(),
                oracle: oracle.address().clone(),
                name: "Elastic Devnet Ether".to_string(),
                symbol: "eETH".to_string(),
            },
            container,
            DEPLOY_GAS,
        )?;
        log::info!("ElasticWrapper at {:?}", elastic.address());

        let mut share = ShareWrapper::load_or_deploy(
            env,
            ShareWrapperInitArgs {
                underlying: token.address().clone(),
                name: "Wrapped Devnet Ether".to_string(),
                symbol: "wdETH".to_string(),
                initial_rate: U256::one(),
            },
            container,
            DEPLOY_GAS,
        )?;
        log::info!("ShareWrapper at {:?}", share.address());

        if !share.is_initialized() {
            let deposit = U256::from(INITIAL_DEPOSIT);
            env.set_gas(CALL_GAS);
            token.mint(&caller, &deposit);
            env.set_gas(CALL_GAS);
            token.approve(&share.address().clone(), &deposit);
            env.set_gas(CALL_GAS);
            share.initialize();
            log::info!("ShareWrapper initial deposit locked");
        }

        println!("elastic wrapper: {:?}", elastic.address());
        println!("share wrapper:   {:?}", share.address());
        Ok(())
    }
}

/// Prints the elastic wrapper's price checkpoint and supply.
pub struct ElasticStatusScenario;

impl Scenario for ElasticStatusScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let wrapper = container.contract_ref::<ElasticWrapper>(env)?;
        let caller = env.caller();

        println!("epoch:           {}", wrapper.epoch());
        println!("last price:      {}", wrapper.last_price());
        println!("max price:       {}", wrapper.max_price());
        println!("total supply:    {}", wrapper.total_supply());
        println!("total underlying: {}", wrapper.total_underlying());
        println!("unissued bits:   {}", wrapper.unissued_bits());
        println!("caller balance:  {}", wrapper.balance_of(&caller));
        Ok(())
    }
}

impl ScenarioMetadata for ElasticStatusScenario {
    const NAME: &'static str = "elastic-status";
    const DESCRIPTION: &'static str = "Prints the elastic wrapper price checkpoint and supply";
}

/// Prints the share wrapper's live rate.
pub struct ShareStatusScenario;

impl Scenario for ShareStatusScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let wrapper = container.contract_ref::<ShareWrapper>(env)?;
        let caller = env.caller();

        println!("initialized:      {}", wrapper.is_initialized());
        println!("total shares:     {}", wrapper.total_supply());
        println!("total underlying: {}", wrapper.total_underlying());
        println!(
            "{} shares:       {}",
            INITIAL_DEPOSIT,
            wrapper.wrapper_to_underlying(U256::from(INITIAL_DEPOSIT))
        );
        println!("caller shares:    {}", wrapper.balance_of(&caller));
        Ok(())
    }
}

impl ScenarioMetadata for ShareStatusScenario {
    const NAME: &'static str = "share-status";
    const DESCRIPTION: &'static str = "Prints the share wrapper totals and rate";
}

/// Republishes the devnet price and rebases the elastic wrapper onto it.
pub struct PublishPriceScenario;

impl Scenario for PublishPriceScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let mut oracle = container.contract_ref::<ManualPriceOracle>(env)?;
        let mut wrapper = container.contract_ref::<ElasticWrapper>(env)?;

        env.set_gas(CALL_GAS);
        oracle.publish_price(devnet_price());
        env.set_gas(CALL_GAS);
        wrapper.rebase();
        log::info!("rebased to epoch {}", wrapper.epoch());
        println!("epoch {} at price {}", wrapper.epoch(), wrapper.last_price());
        Ok(())
    }
}

impl ScenarioMetadata for PublishPriceScenario {
    const NAME: &'static str = "publish-price";
    const DESCRIPTION: &'static str = "Refreshes the devnet oracle price and rebases the elastic wrapper";
}

pub fn main() {
    OdraCli::new()
        .about("Deploys and inspects the elastic and share token wrappers")
        .deploy(WrappersDeployScript)
        .contract::<MockToken>()
        .contract::<ManualPriceOracle>()
        .contract::<ElasticWrapper>()
        .contract::<ShareWrapper>()
        .scenario(ElasticStatusScenario)
        .scenario(ShareStatusScenario)
        .scenario(PublishPriceScenario)
        .build()
        .run();
}
