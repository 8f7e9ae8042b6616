// Copyright (c) 2024 The Botho Foundation

//! Typed-data encodings of the signed records.
//!
//! Member names and order are part of the signing format and must not change.

use xcb_crypto_eip712::{type_closure, Encoder, TypeDef, TypedData};

use crate::types::{Claim, ClaimData, OriginalToken, Permit, SourceTxData, User};

impl TypedData for User {
    const TYPE: TypeDef = TypeDef {
        name: "User",
        members: "address _address,uint256 chainId",
    };

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder.address(self.address).uint(self.chain_id);
    }
}

impl TypedData for OriginalToken {
    const TYPE: TypeDef = TypeDef {
        name: "OriginalToken",
        members: "address tokenAddress,uint256 originChainId",
    };

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder.address(self.token_address).uint(self.origin_chain_id);
    }
}

impl TypedData for SourceTxData {
    const TYPE: TypeDef = TypeDef {
        name: "SourceTxData",
        members: "bytes32 transactionHash,bytes32 blockHash,uint256 logIndex",
    };

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder
            .bytes32(self.transaction_hash)
            .bytes32(self.block_hash)
            .uint(self.log_index);
    }
}

impl TypedData for ClaimData {
    const TYPE: TypeDef = TypeDef {
        name: "ClaimData",
        members: "User from,User to,uint256 value,OriginalToken token,\
                  address depositTxSourceToken,address targetTokenAddress,\
                  string targetTokenName,string targetTokenSymbol,uint256 deadline,\
                  SourceTxData sourceTxData",
    };

    fn referenced_types() -> Vec<TypeDef> {
        let mut defs = type_closure::<User>();
        defs.extend(type_closure::<OriginalToken>());
        defs.extend(type_closure::<SourceTxData>());
        defs
    }

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder
            .typed(&self.from)
            .typed(&self.to)
            .uint(self.value)
            .typed(&self.token)
            .address(self.deposit_tx_source_token)
            .address(self.target_token_address)
            .string(&self.target_token_name)
            .string(&self.target_token_symbol)
            .uint(self.deadline)
            .typed(&self.source_tx_data);
    }
}

impl TypedData for Claim<'_> {
    const TYPE: TypeDef = TypeDef {
        name: "Claim",
        members: "ClaimData _claimData,uint256 nonce",
    };

    fn referenced_types() -> Vec<TypeDef> {
        type_closure::<ClaimData>()
    }

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder.typed(self.claim_data).uint(self.nonce);
    }
}

impl TypedData for Permit {
    const TYPE: TypeDef = TypeDef {
        name: "Permit",
        members: "address owner,address spender,uint256 value,uint256 nonce,uint256 deadline",
    };

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder
            .address(self.owner)
            .address(self.spender)
            .uint(self.value)
            .uint(self.nonce)
            .uint(self.deadline);
    }
}
